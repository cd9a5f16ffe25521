//! # Statistics Aggregator
//!
//! Read-only dashboard and ranking queries over the committed store.
//!
//! All aggregation happens in SQL; nothing here loads full tables into
//! memory. Rankings break ties deterministically by ascending entity id, so
//! the same store always produces the same list.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

// =============================================================================
// Snapshot Types
// =============================================================================

/// One-shot dashboard snapshot. Every figure is computed from the store at
/// call time; calling twice without writes in between yields identical
/// numbers.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TotalsSnapshot {
    pub total_clients: i64,
    pub total_products: i64,
    pub total_sales: i64,
    pub total_purchases: i64,
    /// Sum of sale grand totals, cents.
    pub sales_total_cents: i64,
    /// Sum of purchase grand totals, cents.
    pub purchases_total_cents: i64,
    /// sales_total_cents - purchases_total_cents. Margin over the whole
    /// store history, not per period.
    pub profit_cents: i64,
    /// Σ stock_quantity × selling_price_cents over all products.
    pub stock_value_cents: i64,
    /// Products with stock_quantity <= min_stock.
    pub low_stock_count: i64,
}

/// Sales aggregated for one calendar month of a given year.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MonthlySales {
    /// Month number, 1-12. Months without sales are absent, not zero.
    pub month: i64,
    pub count: i64,
    pub total_cents: i64,
}

/// One row of the best-sellers ranking.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_id: i64,
    pub name: String,
    pub total_quantity: i64,
    pub total_sales_cents: i64,
}

/// One row of the best-clients ranking. Anonymous sales (no client) are
/// excluded.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopClient {
    pub client_id: i64,
    pub name: String,
    pub sale_count: i64,
    pub total_cents: i64,
}

// =============================================================================
// Aggregator
// =============================================================================

/// Computes dashboard figures and rankings. Holds no state beyond the pool.
#[derive(Debug, Clone)]
pub struct Statistics {
    pool: SqlitePool,
}

impl Statistics {
    /// Creates a new Statistics aggregator.
    pub fn new(pool: SqlitePool) -> Self {
        Statistics { pool }
    }

    /// Computes the full dashboard snapshot.
    pub async fn totals(&self) -> DbResult<TotalsSnapshot> {
        let total_clients = self.count("clients").await?;
        let total_products = self.count("products").await?;
        let total_sales = self.count("sales").await?;
        let total_purchases = self.count("purchases").await?;

        let sales_total_cents: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(total_cents), 0) FROM sales")
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;

        let purchases_total_cents: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(total_cents), 0) FROM purchases")
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)?;

        let stock_value_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(stock_quantity * selling_price_cents), 0) FROM products",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        let low_stock_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE stock_quantity <= min_stock",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(TotalsSnapshot {
            total_clients,
            total_products,
            total_sales,
            total_purchases,
            sales_total_cents,
            purchases_total_cents,
            profit_cents: sales_total_cents - purchases_total_cents,
            stock_value_cents,
            low_stock_count,
        })
    }

    async fn count(&self, table: &str) -> DbResult<i64> {
        // table names come from this module only, never from input
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)
    }

    /// Sales grouped by calendar month for one year. Months with no sales
    /// do not appear.
    pub async fn sales_by_month(&self, year: i32) -> DbResult<Vec<MonthlySales>> {
        let rows = sqlx::query_as::<_, MonthlySales>(
            r#"
            SELECT CAST(strftime('%m', sale_date) AS INTEGER) AS month,
                   COUNT(*) AS count,
                   COALESCE(SUM(total_cents), 0) AS total_cents
            FROM sales
            WHERE strftime('%Y', sale_date) = ?1
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(year.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows)
    }

    /// Best-selling products by total quantity sold, descending. Equal
    /// quantities rank by ascending product id.
    pub async fn top_products(&self, limit: i64) -> DbResult<Vec<TopProduct>> {
        let rows = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT si.product_id AS product_id,
                   p.name AS name,
                   SUM(si.quantity) AS total_quantity,
                   SUM(si.total_cents) AS total_sales_cents
            FROM sale_items si
            JOIN products p ON si.product_id = p.id
            GROUP BY si.product_id
            ORDER BY total_quantity DESC, p.id ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows)
    }

    /// Best clients by total spend, descending. Equal totals rank by
    /// ascending client id. Anonymous sales are excluded.
    pub async fn top_clients(&self, limit: i64) -> DbResult<Vec<TopClient>> {
        let rows = sqlx::query_as::<_, TopClient>(
            r#"
            SELECT s.client_id AS client_id,
                   c.name AS name,
                   COUNT(*) AS sale_count,
                   SUM(s.total_cents) AS total_cents
            FROM sales s
            JOIN clients c ON s.client_id = c.id
            GROUP BY s.client_id
            ORDER BY total_cents DESC, c.id ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::CreateSale;
    use crate::pool::{Database, DbConfig};
    use comptoir_core::{LineRequest, NewClient, NewProduct};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn add_product(db: &Database, name: &str, price_cents: i64) -> i64 {
        db.products()
            .add(&NewProduct {
                name: name.to_string(),
                selling_price_cents: price_cents,
                purchase_price_cents: price_cents / 2,
                min_stock: 5,
                ..Default::default()
            })
            .await
            .unwrap()
    }

    async fn add_client(db: &Database, name: &str) -> i64 {
        db.clients()
            .add(&NewClient {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    async fn sell(db: &Database, invoice: &str, client: Option<i64>, lines: Vec<LineRequest>) {
        db.orders()
            .create_sale(&CreateSale {
                invoice_number: invoice.to_string(),
                client_id: client,
                lines,
                tax_rate_bps: 0,
                ..Default::default()
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_totals_empty_store() {
        let db = test_db().await;
        let totals = db.stats().totals().await.unwrap();

        assert_eq!(totals.total_clients, 0);
        assert_eq!(totals.total_sales, 0);
        assert_eq!(totals.sales_total_cents, 0);
        assert_eq!(totals.profit_cents, 0);
        assert_eq!(totals.stock_value_cents, 0);
    }

    #[tokio::test]
    async fn test_totals_are_idempotent() {
        let db = test_db().await;
        let product = add_product(&db, "Stylo", 1_000).await;
        let client = add_client(&db, "Aya").await;
        db.ledger().adjust_stock(product, 10, None).await.unwrap();
        sell(&db, "INV-1", Some(client), vec![LineRequest::new(product, 2, 1_000)]).await;

        let first = db.stats().totals().await.unwrap();
        let second = db.stats().totals().await.unwrap();

        assert_eq!(first.total_sales, 1);
        assert_eq!(first.sales_total_cents, 2_000);
        assert_eq!(first.sales_total_cents, second.sales_total_cents);
        assert_eq!(first.stock_value_cents, second.stock_value_cents);
        // 8 left in stock at 1000 each
        assert_eq!(first.stock_value_cents, 8_000);
    }

    #[tokio::test]
    async fn test_low_stock_counts_boundary() {
        let db = test_db().await;
        // min_stock is 5 in the helper; 5 on hand counts as low, 6 does not
        let low = add_product(&db, "Low", 1_000).await;
        let ok = add_product(&db, "Ok", 1_000).await;
        db.ledger().adjust_stock(low, 5, None).await.unwrap();
        db.ledger().adjust_stock(ok, 6, None).await.unwrap();

        let totals = db.stats().totals().await.unwrap();
        assert_eq!(totals.low_stock_count, 1);
    }

    #[tokio::test]
    async fn test_top_products_ties_break_by_id() {
        let db = test_db().await;
        let a = add_product(&db, "A", 500).await;
        let b = add_product(&db, "B", 500).await;
        let c = add_product(&db, "C", 100).await;

        // A and B tie on quantity, C trails
        sell(&db, "INV-1", None, vec![LineRequest::new(a, 5, 500)]).await;
        sell(&db, "INV-2", None, vec![LineRequest::new(b, 5, 500)]).await;
        sell(&db, "INV-3", None, vec![LineRequest::new(c, 1, 100)]).await;

        let top = db.stats().top_products(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, a);
        assert_eq!(top[1].product_id, b);
        assert_eq!(top[0].total_quantity, 5);

        // identical store, identical ranking
        let again = db.stats().top_products(2).await.unwrap();
        assert_eq!(again[0].product_id, a);
        assert_eq!(again[1].product_id, b);
    }

    #[tokio::test]
    async fn test_top_clients_ties_break_by_id() {
        let db = test_db().await;
        let product = add_product(&db, "Stylo", 100).await;
        let a = add_client(&db, "A").await;
        let b = add_client(&db, "B").await;
        let c = add_client(&db, "C").await;

        sell(&db, "INV-1", Some(a), vec![LineRequest::new(product, 5, 100)]).await;
        sell(&db, "INV-2", Some(b), vec![LineRequest::new(product, 5, 100)]).await;
        sell(&db, "INV-3", Some(c), vec![LineRequest::new(product, 1, 100)]).await;

        let top = db.stats().top_clients(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].client_id, a);
        assert_eq!(top[1].client_id, b);
        assert_eq!(top[0].total_cents, 500);
    }

    #[tokio::test]
    async fn test_top_clients_excludes_anonymous() {
        let db = test_db().await;
        let product = add_product(&db, "Stylo", 1_000).await;
        let client = add_client(&db, "Aya").await;

        sell(&db, "INV-1", Some(client), vec![LineRequest::new(product, 1, 1_000)]).await;
        sell(&db, "INV-2", None, vec![LineRequest::new(product, 9, 1_000)]).await;

        let top = db.stats().top_clients(10).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].client_id, client);
        assert_eq!(top[0].sale_count, 1);
        assert_eq!(top[0].total_cents, 1_000);
    }

    #[tokio::test]
    async fn test_sales_by_month_groups_current_year() {
        let db = test_db().await;
        let product = add_product(&db, "Stylo", 1_000).await;
        sell(&db, "INV-1", None, vec![LineRequest::new(product, 1, 1_000)]).await;
        sell(&db, "INV-2", None, vec![LineRequest::new(product, 2, 1_000)]).await;

        let year = chrono::Utc::now().format("%Y").to_string().parse().unwrap();
        let months = db.stats().sales_by_month(year).await.unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].count, 2);
        assert_eq!(months[0].total_cents, 3_000);

        let empty = db.stats().sales_by_month(year - 1).await.unwrap();
        assert!(empty.is_empty());
    }
}
