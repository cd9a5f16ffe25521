//! # Stock Ledger
//!
//! Append-only movement log plus the cached per-product quantity.
//!
//! ## Single Writer Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Stock Ledger                                   │
//! │                                                                     │
//! │  Order Engine (sales/purchases) ──┐                                 │
//! │                                   ├──► apply_movement()             │
//! │  Manual corrections ──────────────┘         │                       │
//! │                                             ▼                       │
//! │              ┌──────────────────────────────────────────┐           │
//! │              │ one transaction:                         │           │
//! │              │  UPDATE products SET stock_quantity += Δ │           │
//! │              │  INSERT INTO stock_movements (...)       │           │
//! │              └──────────────────────────────────────────┘           │
//! │                                                                     │
//! │  Invariant: products.stock_quantity == Σ movements.quantity         │
//! │  Nothing else in the codebase writes stock_quantity.                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cached column exists for O(1) reads on the hot path; the ledger sum
//! is only recomputed for reconciliation checks, never per read.
//!
//! Quantities may go negative: over-selling is a business decision left to
//! the operator, not blocked here.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use comptoir_core::{MovementType, StockMovement};

/// Maintains the movement log and the cached quantity per product.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Applies a signed stock movement on the caller's connection.
    ///
    /// Increments the cached quantity and appends the movement row as one
    /// unit of work. This function never commits: when called inside an
    /// order engine transaction it rolls back with the order; the manual
    /// path ([`StockLedger::adjust_stock`]) wraps it in its own transaction.
    ///
    /// ## Returns
    /// The id of the inserted movement row.
    ///
    /// ## Errors
    /// `DbError::NotFound` if the product does not exist. The quantity is
    /// allowed to go negative.
    pub async fn apply_movement(
        conn: &mut SqliteConnection,
        product_id: i64,
        delta: i64,
        movement_type: MovementType,
        reference: Option<&str>,
        notes: Option<&str>,
    ) -> DbResult<i64> {
        debug!(product_id, delta, ?movement_type, "Applying stock movement");

        let now = Utc::now();

        let updated = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO stock_movements
                (product_id, movement_type, quantity, reference, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(product_id)
        .bind(movement_type)
        .bind(delta)
        .bind(reference)
        .bind(notes)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(inserted.last_insert_rowid())
    }

    /// Manual stock correction: records an `adjustment` movement in its own
    /// transaction.
    ///
    /// ## Returns
    /// The id of the recorded movement.
    pub async fn adjust_stock(
        &self,
        product_id: i64,
        delta: i64,
        notes: Option<&str>,
    ) -> DbResult<i64> {
        let mut tx = self.pool.begin().await?;

        let movement_id = Self::apply_movement(
            &mut *tx,
            product_id,
            delta,
            MovementType::Adjustment,
            None,
            notes,
        )
        .await?;

        tx.commit().await?;

        debug!(product_id, delta, movement_id, "Stock adjusted");
        Ok(movement_id)
    }

    /// Returns the cached quantity for a product. O(1); never recomputed
    /// from the log on the hot path.
    pub async fn current_quantity(&self, product_id: i64) -> DbResult<i64> {
        let quantity: Option<i64> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;

        quantity.ok_or_else(|| DbError::not_found("Product", product_id))
    }

    /// Recomputes the quantity from the movement log.
    ///
    /// Reconciliation support: for a healthy store this always equals
    /// [`StockLedger::current_quantity`]. Used by tests and audits, not by
    /// regular reads.
    pub async fn reconciled_quantity(&self, product_id: i64) -> DbResult<i64> {
        let sum: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(quantity) FROM stock_movements WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(sum.unwrap_or(0))
    }

    /// Returns the movement history for a product, newest first.
    pub async fn movements_for_product(&self, product_id: i64) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, movement_type, quantity, reference, notes, created_at
            FROM stock_movements
            WHERE product_id = ?1
            ORDER BY id DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use comptoir_core::NewProduct;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn add_product(db: &Database, name: &str) -> i64 {
        db.products()
            .add(&NewProduct {
                name: name.to_string(),
                selling_price_cents: 1000,
                purchase_price_cents: 600,
                min_stock: 5,
                ..Default::default()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_adjust_stock_and_reconcile() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product_id = add_product(&db, "Stylo").await;

        ledger.adjust_stock(product_id, 10, Some("initial count")).await.unwrap();
        ledger.adjust_stock(product_id, -3, None).await.unwrap();
        ledger.adjust_stock(product_id, 7, None).await.unwrap();

        assert_eq!(ledger.current_quantity(product_id).await.unwrap(), 14);
        assert_eq!(ledger.reconciled_quantity(product_id).await.unwrap(), 14);
    }

    #[tokio::test]
    async fn test_negative_stock_is_permitted() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product_id = add_product(&db, "Cahier").await;

        ledger.adjust_stock(product_id, -4, None).await.unwrap();

        assert_eq!(ledger.current_quantity(product_id).await.unwrap(), -4);
        assert_eq!(ledger.reconciled_quantity(product_id).await.unwrap(), -4);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let db = test_db().await;
        let ledger = db.ledger();

        let err = ledger.adjust_stock(999, 5, None).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // and nothing was recorded
        assert_eq!(ledger.reconciled_quantity(999).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_movement_history_newest_first() {
        let db = test_db().await;
        let ledger = db.ledger();
        let product_id = add_product(&db, "Agrafeuse").await;

        ledger.adjust_stock(product_id, 5, None).await.unwrap();
        ledger.adjust_stock(product_id, -2, None).await.unwrap();

        let movements = ledger.movements_for_product(product_id).await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].quantity, -2);
        assert_eq!(movements[1].quantity, 5);
        assert!(movements
            .iter()
            .all(|m| m.movement_type == MovementType::Adjustment));
    }
}
