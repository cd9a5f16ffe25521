//! # Entity Repositories
//!
//! CRUD access for the entities orders reference: clients, suppliers,
//! categories, products, plus the key/value settings store.
//!
//! Repositories never touch order rows. Deleting an entity that historical
//! orders still reference is blocked by foreign key enforcement and
//! surfaces as `DbError::ForeignKeyViolation`; nothing cascades into order
//! history.

pub mod category;
pub mod client;
pub mod product;
pub mod settings;
pub mod supplier;
