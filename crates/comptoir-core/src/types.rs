//! # Domain Types
//!
//! Core domain types used throughout Comptoir.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────────┐     │
//! │  │    Product    │   │  Sale/Purchase│   │  StockMovement    │     │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────────── │     │
//! │  │ id (i64)      │   │ id (i64)      │   │ id (i64)          │     │
//! │  │ prices (cents)│   │ invoice no.   │   │ signed quantity   │     │
//! │  │ stock (cached)│   │ totals (cents)│   │ movement type     │     │
//! │  └───────────────┘   └───────────────┘   └───────────────────┘     │
//! │                                                                     │
//! │  Client / Supplier / Category: plain CRUD records                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle Rules
//! - Order rows (header, lines, movements) are created together and never
//!   mutated after commit.
//! - `Product.stock_quantity` is a denormalized cache of the movement log;
//!   only the stock ledger writes it.
//! - Entities are created/edited/deleted independently of orders and carry
//!   no ownership over historical order rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, TaxRate};

// =============================================================================
// Enumerations
// =============================================================================

/// How an order was paid.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Check,
    Transfer,
    Mobile,
    Credit,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

/// Why a stock movement happened.
///
/// Sales and purchases are recorded by the order engine; adjustments and
/// returns come through the manual correction path.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Sale,
    Purchase,
    Adjustment,
    Return,
}

// =============================================================================
// Client / Supplier
// =============================================================================

/// A customer. Only the name is required.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Tax identification number (NIF).
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or updating a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

/// A supplier. Same shape as [`Client`], kept separate because sales and
/// purchases reference them independently.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or updating a supplier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

// =============================================================================
// Category
// =============================================================================

/// A product category. Names are unique.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product held in stock.
///
/// `stock_quantity` is a cache of the movement ledger and may be negative:
/// over-selling is permitted by policy and surfaced to operators by the UI,
/// not blocked here.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    /// Joined category name, if any (read-only display field).
    pub category_name: Option<String>,
    /// What we pay for one unit, in cents.
    pub purchase_price_cents: i64,
    /// What we charge for one unit, in cents. Always > 0.
    pub selling_price_cents: i64,
    /// Cached quantity. Invariant: equals the sum of this product's
    /// stock movement deltas. Written only by the stock ledger.
    pub stock_quantity: i64,
    /// Low-stock threshold; quantity at or below it flags the product.
    pub min_stock: i64,
    /// Optional barcode; not required to be unique.
    pub barcode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as Money.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Returns the purchase price as Money.
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    /// True when the cached quantity is at or below the configured minimum.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock
    }
}

/// Input for creating or updating a product.
///
/// There is deliberately no initial stock field: stock only enters the
/// system through the ledger (purchases or manual adjustments), which keeps
/// the cached quantity reconcilable against the movement log from day one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub purchase_price_cents: i64,
    pub selling_price_cents: i64,
    pub min_stock: i64,
    pub barcode: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale header.
///
/// Monetary fields are stored, not recomputed on read, so historical
/// invoices keep the tax rate in force when they were issued.
/// Invariant: `total == subtotal + tax_amount - discount`.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub invoice_number: String,
    /// None for anonymous cash sales.
    pub client_id: Option<i64>,
    /// Joined client name; None for anonymous sales.
    pub client_name: Option<String>,
    pub sale_date: DateTime<Utc>,
    pub subtotal_cents: i64,
    pub tax_rate_bps: u32,
    pub tax_amount_cents: i64,
    /// Order-level discount amount (not a percentage).
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

/// One line of a sale. Immutable once the parent sale is committed;
/// corrections happen through a new order or an adjustment movement.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    /// Joined product name for display.
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Per-line discount in basis points (0-10000).
    pub discount_bps: u32,
    /// `quantity * unit_price * (1 - discount_bps/10000)`, rounded to cents.
    pub total_cents: i64,
}

/// A sale header together with its lines, as returned by the order engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleWithLines {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

// =============================================================================
// Purchase
// =============================================================================

/// A committed purchase header. Symmetric to [`Sale`] except there is no
/// order-level discount and stock movements are positive.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub reference: String,
    pub supplier_id: Option<i64>,
    /// Joined supplier name; None if the supplier is unset.
    pub supplier_name: Option<String>,
    pub purchase_date: DateTime<Utc>,
    pub subtotal_cents: i64,
    pub tax_rate_bps: u32,
    pub tax_amount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One line of a purchase. `total_cents == quantity * unit_price_cents`.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub id: i64,
    pub purchase_id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_cents: i64,
}

/// A purchase header together with its lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseWithLines {
    pub purchase: Purchase,
    pub lines: Vec<PurchaseLine>,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// One signed stock change recorded against a product.
///
/// The movement log is append-only and is the sole source of truth for
/// stock history. For every product the cached quantity must equal the sum
/// of its movements' `quantity` fields.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    pub movement_type: MovementType,
    /// Signed delta: negative for sales, positive for purchases/returns.
    pub quantity: i64,
    /// Free-text reference, e.g. the invoice number that caused this.
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
