//! # Comptoir Database Layer
//!
//! SQLite persistence for Comptoir: the transactional order engine, the
//! stock ledger, entity repositories, statistics and the settings store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       comptoir-db                                   │
//! │                                                                     │
//! │  Database (pool + migrations)                                       │
//! │      │                                                              │
//! │      ├── OrderEngine ──── sales/purchases, one tx per order         │
//! │      │        │                                                     │
//! │      ├── StockLedger ──── movement log + cached quantities          │
//! │      │                                                              │
//! │      ├── Statistics ───── dashboard totals, rankings                │
//! │      │                                                              │
//! │      ├── repositories ─── clients, suppliers, categories, products  │
//! │      │                                                              │
//! │      └── SettingsRepository ─ key/value store                       │
//! │                                                                     │
//! │  Pure money/order math lives in comptoir-core; this crate owns      │
//! │  all I/O.                                                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//! ```rust,ignore
//! use comptoir_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("comptoir.db")).await?;
//! let products = db.products().list().await?;
//! ```

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod orders;
pub mod pool;
pub mod repository;
pub mod stats;

pub use error::{DbError, DbResult, OrderError, OrderResult};
pub use ledger::StockLedger;
pub use orders::{CreatePurchase, CreateSale, OrderEngine, SaleFilter};
pub use pool::{Database, DbConfig};
pub use repository::category::CategoryRepository;
pub use repository::client::ClientRepository;
pub use repository::product::ProductRepository;
pub use repository::settings::SettingsRepository;
pub use repository::supplier::SupplierRepository;
pub use stats::{MonthlySales, Statistics, TopClient, TopProduct, TotalsSnapshot};
