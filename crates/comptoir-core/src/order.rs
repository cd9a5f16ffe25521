//! # Order Math
//!
//! Pure computation of line totals and order totals for sales and
//! purchases. The order engine in comptoir-db calls into this module, then
//! persists exactly what it computed: the database stores results, it never
//! re-derives them.
//!
//! ## Total Formulae
//! ```text
//! sale line     = qty * unit_price * (1 - discount_bps/10000)
//! purchase line = qty * unit_price
//! subtotal      = Σ line totals
//! tax           = subtotal * tax_rate_bps/10000
//! total         = subtotal + tax - order_discount     (sales)
//!               = subtotal + tax                      (purchases)
//! ```
//! Each derived amount is rounded half-up to the cent exactly once, at the
//! step where it is produced.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::money::{Money, TaxRate};
use crate::validation::{validate_discount_bps, validate_price_cents, validate_quantity};

// =============================================================================
// Line Request
// =============================================================================

/// One requested order line: what the caller wants to sell or buy.
///
/// The same shape serves both order kinds; purchases must carry
/// `discount_bps == 0` (there is no per-line discount on purchases).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Per-line discount in basis points (0-10000). Sales only.
    #[serde(default)]
    pub discount_bps: u32,
}

impl LineRequest {
    /// Convenience constructor for an undiscounted line.
    pub fn new(product_id: i64, quantity: i64, unit_price_cents: i64) -> Self {
        LineRequest {
            product_id,
            quantity,
            unit_price_cents,
            discount_bps: 0,
        }
    }

    /// Same, with a per-line discount.
    pub fn discounted(
        product_id: i64,
        quantity: i64,
        unit_price_cents: i64,
        discount_bps: u32,
    ) -> Self {
        LineRequest {
            product_id,
            quantity,
            unit_price_cents,
            discount_bps,
        }
    }
}

/// Validates a sale line: positive quantity, non-negative price,
/// discount within 0-100%.
pub fn validate_sale_line(line: &LineRequest) -> ValidationResult<()> {
    validate_quantity(line.quantity)?;
    validate_price_cents(line.unit_price_cents)?;
    validate_discount_bps(line.discount_bps)?;
    Ok(())
}

/// Validates a purchase line. Purchases carry no per-line discount.
pub fn validate_purchase_line(line: &LineRequest) -> ValidationResult<()> {
    validate_quantity(line.quantity)?;
    validate_price_cents(line.unit_price_cents)?;
    if line.discount_bps != 0 {
        return Err(ValidationError::OutOfRange {
            field: "discount_bps".to_string(),
            min: 0,
            max: 0,
        });
    }
    Ok(())
}

// =============================================================================
// Totals
// =============================================================================

/// The monetary breakdown of an order, as stored on its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

/// Total for a single sale line, discount applied.
pub fn sale_line_total(line: &LineRequest) -> Money {
    Money::from_cents(line.unit_price_cents)
        .multiply_quantity(line.quantity)
        .apply_discount(line.discount_bps)
}

/// Total for a single purchase line.
pub fn purchase_line_total(line: &LineRequest) -> Money {
    Money::from_cents(line.unit_price_cents).multiply_quantity(line.quantity)
}

/// Computes sale totals from validated lines.
///
/// `discount` is the order-level discount amount subtracted after tax;
/// it is independent of the per-line percentage discounts.
pub fn sale_totals(lines: &[LineRequest], tax_rate: TaxRate, discount: Money) -> OrderTotals {
    let subtotal = lines
        .iter()
        .map(sale_line_total)
        .fold(Money::zero(), |acc, t| acc + t);
    let tax = subtotal.calculate_tax(tax_rate);

    OrderTotals {
        subtotal,
        tax,
        discount,
        total: subtotal + tax - discount,
    }
}

/// Computes purchase totals from validated lines.
pub fn purchase_totals(lines: &[LineRequest], tax_rate: TaxRate) -> OrderTotals {
    let subtotal = lines
        .iter()
        .map(purchase_line_total)
        .fold(Money::zero(), |acc, t| acc + t);
    let tax = subtotal.calculate_tax(tax_rate);

    OrderTotals {
        subtotal,
        tax,
        discount: Money::zero(),
        total: subtotal + tax,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
