//! # comptoir-core: Pure Business Logic for Comptoir
//!
//! This crate is the heart of the Comptoir order and inventory system. It
//! contains all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Comptoir Architecture                           │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │       External consumers (UI, reports, export tools)          │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! │                                  │                                  │
//! │  ┌───────────────────────────────▼───────────────────────────────┐ │
//! │  │              ★ comptoir-core (THIS CRATE) ★                   │ │
//! │  │                                                               │ │
//! │  │  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌────────────┐       │ │
//! │  │  │  types  │  │  money  │  │  order  │  │ validation │       │ │
//! │  │  │ Product │  │  Money  │  │ totals  │  │   rules    │       │ │
//! │  │  │  Sale   │  │ TaxRate │  │  lines  │  │   checks   │       │ │
//! │  │  └─────────┘  └─────────┘  └─────────┘  └────────────┘       │ │
//! │  │                                                               │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! │                                  │                                  │
//! │  ┌───────────────────────────────▼───────────────────────────────┐ │
//! │  │              comptoir-db (Database Layer)                     │ │
//! │  │     SQLite repositories, stock ledger, order engine           │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Purchase, StockMovement, ...)
//! - [`money`] - Money and TaxRate with integer arithmetic (no floating point!)
//! - [`order`] - Line and order total computation
//! - [`error`] - Validation error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

// Re-exports for convenience: `use comptoir_core::Money` instead of
// `use comptoir_core::money::Money`.

pub use error::ValidationError;
pub use money::{Money, TaxRate};
pub use order::{LineRequest, OrderTotals};
pub use types::*;

/// Default tax rate applied to sales, in basis points (19%).
///
/// Stored on each sale header at creation time so that historical invoices
/// keep the rate that was in force when they were issued.
pub const DEFAULT_SALE_TAX_BPS: u32 = 1900;

/// Default tax rate applied to purchases, in basis points (10%).
pub const DEFAULT_PURCHASE_TAX_BPS: u32 = 1000;
