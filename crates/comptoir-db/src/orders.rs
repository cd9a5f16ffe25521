//! # Order Engine
//!
//! The only writer of sale/purchase headers and lines, and the only caller
//! of the stock ledger for order-originated movements.
//!
//! ## Commit Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     create_sale / create_purchase                   │
//! │                                                                     │
//! │  1. VALIDATE (before any write)                                     │
//! │     ├── lines non-empty                                             │
//! │     ├── per line: quantity > 0, price ≥ 0, discount 0-100%          │
//! │     └── order: tax rate 0-100%, discount amount ≥ 0                 │
//! │                                                                     │
//! │  2. COMPUTE totals (comptoir-core, pure)                            │
//! │                                                                     │
//! │  3. ONE TRANSACTION                                                 │
//! │     ├── insert header (duplicate number → typed rejection)          │
//! │     ├── for each line:                                              │
//! │     │     ├── product must exist                                    │
//! │     │     ├── insert line row                                       │
//! │     │     └── ledger movement (−qty sale / +qty purchase)           │
//! │     └── commit                                                      │
//! │                                                                     │
//! │  Any failure at any step rolls the whole set back: no partial       │
//! │  order, no partial stock change.                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Over-sell policy: a sale whose quantity exceeds current stock is NOT
//! rejected; stock goes negative and the operator is expected to have been
//! warned by the UI beforehand. This is a deliberate, tested behavior.

use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, OrderError, OrderResult};
use crate::ledger::StockLedger;
use comptoir_core::order::{
    purchase_line_total, purchase_totals, sale_line_total, sale_totals, validate_purchase_line,
    validate_sale_line,
};
use comptoir_core::validation::{validate_discount_cents, validate_tax_rate_bps};
use comptoir_core::{
    LineRequest, Money, MovementType, PaymentMethod, Purchase, PurchaseLine, PurchaseWithLines,
    Sale, SaleLine, SaleWithLines, TaxRate,
};

// =============================================================================
// Requests
// =============================================================================

/// Request to create a sale.
#[derive(Debug, Clone, Default)]
pub struct CreateSale {
    /// Unique invoice number, produced by the caller (or via
    /// [`generate_order_number`]). Duplicates are rejected, never
    /// overwritten.
    pub invoice_number: String,
    /// None for anonymous cash sales.
    pub client_id: Option<i64>,
    pub lines: Vec<LineRequest>,
    pub payment_method: PaymentMethod,
    /// Tax rate in basis points (1900 = 19%).
    pub tax_rate_bps: u32,
    /// Order-level discount amount in cents, subtracted after tax.
    pub discount_cents: i64,
    pub notes: Option<String>,
}

/// Request to create a purchase. Symmetric to [`CreateSale`] minus the
/// discounts (purchases carry neither per-line nor order-level discounts).
#[derive(Debug, Clone, Default)]
pub struct CreatePurchase {
    /// Unique purchase reference.
    pub reference: String,
    pub supplier_id: Option<i64>,
    pub lines: Vec<LineRequest>,
    pub payment_method: PaymentMethod,
    pub tax_rate_bps: u32,
    pub notes: Option<String>,
}

/// Filter for listing sales.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    /// Inclusive lower bound on the sale date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the sale date.
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

// =============================================================================
// Engine
// =============================================================================

/// Builds order headers and lines from requests and drives the stock
/// ledger atomically.
#[derive(Debug, Clone)]
pub struct OrderEngine {
    pool: SqlitePool,
}

impl OrderEngine {
    /// Creates a new OrderEngine.
    pub fn new(pool: SqlitePool) -> Self {
        OrderEngine { pool }
    }

    /// Creates a sale: header + N lines + N negative stock movements, all
    /// or nothing.
    ///
    /// ## Returns
    /// The id of the committed sale.
    pub async fn create_sale(&self, req: &CreateSale) -> OrderResult<i64> {
        if req.lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        for (index, line) in req.lines.iter().enumerate() {
            validate_sale_line(line).map_err(|source| OrderError::InvalidLine { index, source })?;
        }
        validate_tax_rate_bps(req.tax_rate_bps)?;
        validate_discount_cents(req.discount_cents)?;

        let totals = sale_totals(
            &req.lines,
            TaxRate::from_bps(req.tax_rate_bps),
            Money::from_cents(req.discount_cents),
        );

        debug!(
            invoice = %req.invoice_number,
            lines = req.lines.len(),
            total_cents = totals.total.cents(),
            "Creating sale"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let header = sqlx::query(
            r#"
            INSERT INTO sales
                (invoice_number, client_id, sale_date,
                 subtotal_cents, tax_rate_bps, tax_amount_cents,
                 discount_cents, total_cents,
                 payment_method, payment_status, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&req.invoice_number)
        .bind(req.client_id)
        .bind(now)
        .bind(totals.subtotal.cents())
        .bind(req.tax_rate_bps)
        .bind(totals.tax.cents())
        .bind(totals.discount.cents())
        .bind(totals.total.cents())
        .bind(req.payment_method)
        .bind("paid")
        .bind(&req.notes)
        .bind(now)
        .execute(&mut *tx)
        .await;

        let sale_id = match header {
            Ok(result) => result.last_insert_rowid(),
            Err(e) => {
                return Err(match DbError::from(e) {
                    DbError::UniqueViolation { .. } => {
                        OrderError::DuplicateNumber(req.invoice_number.clone())
                    }
                    other => OrderError::Db(other),
                })
            }
        };

        for line in &req.lines {
            Self::ensure_product_exists(&mut tx, line.product_id).await?;

            sqlx::query(
                r#"
                INSERT INTO sale_items
                    (sale_id, product_id, quantity, unit_price_cents, discount_bps, total_cents)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.discount_bps)
            .bind(sale_line_total(line).cents())
            .execute(&mut *tx)
            .await?;

            StockLedger::apply_movement(
                &mut tx,
                line.product_id,
                -line.quantity,
                MovementType::Sale,
                Some(&req.invoice_number),
                None,
            )
            .await?;
        }

        tx.commit().await?;

        info!(sale_id, invoice = %req.invoice_number, "Sale committed");
        Ok(sale_id)
    }

    /// Creates a purchase: header + N lines + N positive stock movements,
    /// all or nothing.
    pub async fn create_purchase(&self, req: &CreatePurchase) -> OrderResult<i64> {
        if req.lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        for (index, line) in req.lines.iter().enumerate() {
            validate_purchase_line(line)
                .map_err(|source| OrderError::InvalidLine { index, source })?;
        }
        validate_tax_rate_bps(req.tax_rate_bps)?;

        let totals = purchase_totals(&req.lines, TaxRate::from_bps(req.tax_rate_bps));

        debug!(
            reference = %req.reference,
            lines = req.lines.len(),
            total_cents = totals.total.cents(),
            "Creating purchase"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let header = sqlx::query(
            r#"
            INSERT INTO purchases
                (reference, supplier_id, purchase_date,
                 subtotal_cents, tax_rate_bps, tax_amount_cents, total_cents,
                 payment_method, payment_status, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&req.reference)
        .bind(req.supplier_id)
        .bind(now)
        .bind(totals.subtotal.cents())
        .bind(req.tax_rate_bps)
        .bind(totals.tax.cents())
        .bind(totals.total.cents())
        .bind(req.payment_method)
        .bind("paid")
        .bind(&req.notes)
        .bind(now)
        .execute(&mut *tx)
        .await;

        let purchase_id = match header {
            Ok(result) => result.last_insert_rowid(),
            Err(e) => {
                return Err(match DbError::from(e) {
                    DbError::UniqueViolation { .. } => {
                        OrderError::DuplicateNumber(req.reference.clone())
                    }
                    other => OrderError::Db(other),
                })
            }
        };

        for line in &req.lines {
            Self::ensure_product_exists(&mut tx, line.product_id).await?;

            sqlx::query(
                r#"
                INSERT INTO purchase_items
                    (purchase_id, product_id, quantity, unit_price_cents, total_cents)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(purchase_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(purchase_line_total(line).cents())
            .execute(&mut *tx)
            .await?;

            StockLedger::apply_movement(
                &mut tx,
                line.product_id,
                line.quantity,
                MovementType::Purchase,
                Some(&req.reference),
                None,
            )
            .await?;
        }

        tx.commit().await?;

        info!(purchase_id, reference = %req.reference, "Purchase committed");
        Ok(purchase_id)
    }

    async fn ensure_product_exists(
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        product_id: i64,
    ) -> OrderResult<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await?;

        if exists.is_none() {
            return Err(OrderError::ProductNotFound(product_id));
        }
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetches one sale with its lines.
    pub async fn get_sale(&self, id: i64) -> OrderResult<Option<SaleWithLines>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT s.id, s.invoice_number, s.client_id, c.name AS client_name,
                   s.sale_date, s.subtotal_cents, s.tax_rate_bps, s.tax_amount_cents,
                   s.discount_cents, s.total_cents, s.payment_method,
                   s.payment_status, s.notes, s.created_at
            FROM sales s
            LEFT JOIN clients c ON s.client_id = c.id
            WHERE s.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT si.id, si.sale_id, si.product_id, p.name AS product_name,
                   si.quantity, si.unit_price_cents, si.discount_bps, si.total_cents
            FROM sale_items si
            LEFT JOIN products p ON si.product_id = p.id
            WHERE si.sale_id = ?1
            ORDER BY si.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(Some(SaleWithLines { sale, lines }))
    }

    /// Fetches one purchase with its lines.
    pub async fn get_purchase(&self, id: i64) -> OrderResult<Option<PurchaseWithLines>> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT p.id, p.reference, p.supplier_id, f.name AS supplier_name,
                   p.purchase_date, p.subtotal_cents, p.tax_rate_bps, p.tax_amount_cents,
                   p.total_cents, p.payment_method, p.payment_status, p.notes, p.created_at
            FROM purchases p
            LEFT JOIN suppliers f ON p.supplier_id = f.id
            WHERE p.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let Some(purchase) = purchase else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, PurchaseLine>(
            r#"
            SELECT pi.id, pi.purchase_id, pi.product_id, p.name AS product_name,
                   pi.quantity, pi.unit_price_cents, pi.total_cents
            FROM purchase_items pi
            LEFT JOIN products p ON pi.product_id = p.id
            WHERE pi.purchase_id = ?1
            ORDER BY pi.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(Some(PurchaseWithLines { purchase, lines }))
    }

    /// Lists sales, newest first, optionally bounded by date and count.
    pub async fn list_sales(&self, filter: &SaleFilter) -> OrderResult<Vec<Sale>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT s.id, s.invoice_number, s.client_id, c.name AS client_name,
                   s.sale_date, s.subtotal_cents, s.tax_rate_bps, s.tax_amount_cents,
                   s.discount_cents, s.total_cents, s.payment_method,
                   s.payment_status, s.notes, s.created_at
            FROM sales s
            LEFT JOIN clients c ON s.client_id = c.id
            WHERE 1 = 1
            "#,
        );

        if let Some(from) = filter.from {
            query.push(" AND DATE(s.sale_date) >= ");
            query.push_bind(from.to_string());
        }
        if let Some(to) = filter.to {
            query.push(" AND DATE(s.sale_date) <= ");
            query.push_bind(to.to_string());
        }

        query.push(" ORDER BY s.sale_date DESC, s.id DESC");

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ");
            query.push_bind(limit);
        }

        let sales = query
            .build_query_as::<Sale>()
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(sales)
    }

    /// Lists purchases, newest first.
    pub async fn list_purchases(&self, limit: Option<i64>) -> OrderResult<Vec<Purchase>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT p.id, p.reference, p.supplier_id, f.name AS supplier_name,
                   p.purchase_date, p.subtotal_cents, p.tax_rate_bps, p.tax_amount_cents,
                   p.total_cents, p.payment_method, p.payment_status, p.notes, p.created_at
            FROM purchases p
            LEFT JOIN suppliers f ON p.supplier_id = f.id
            ORDER BY p.purchase_date DESC, p.id DESC
            "#,
        );

        if let Some(limit) = limit {
            query.push(" LIMIT ");
            query.push_bind(limit);
        }

        let purchases = query
            .build_query_as::<Purchase>()
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(purchases)
    }
}

/// Generates an order number in format `{PREFIX}-YYYYMMDD-NNNN`.
///
/// Example: `INV-20260826-0137`. The sequence part is derived from the
/// current timestamp; callers needing gap-free legal numbering should
/// supply their own numbers instead.
pub fn generate_order_number(prefix: &str) -> String {
    let now = Utc::now();
    let seq = (now.timestamp_millis() % 10_000) as u32;
    format!("{}-{}-{:04}", prefix, now.format("%Y%m%d"), seq)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use comptoir_core::{NewClient, NewProduct};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn add_product(db: &Database, name: &str, selling_cents: i64) -> i64 {
        db.products()
            .add(&NewProduct {
                name: name.to_string(),
                selling_price_cents: selling_cents,
                purchase_price_cents: selling_cents / 2,
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

    #[tokio::test]
    async fn test_create_sale_commits_header_lines_and_movements() {
        let db = test_db().await;
        let engine = db.orders();
        let ledger = db.ledger();

        let product = add_product(&db, "Stylo", 10_000).await;
        let client = add_client(&db, "Aya Benali").await;
        ledger.adjust_stock(product, 50, None).await.unwrap();

        let sale_id = engine
            .create_sale(&CreateSale {
                invoice_number: "INV-001".to_string(),
                client_id: Some(client),
                lines: vec![
                    LineRequest::discounted(product, 2, 10_000, 1000),
                ],
                payment_method: PaymentMethod::Cash,
                tax_rate_bps: 1900,
                discount_cents: 0,
                notes: None,
            })
            .await
            .unwrap();

        let sale = engine.get_sale(sale_id).await.unwrap().unwrap();
        assert_eq!(sale.sale.invoice_number, "INV-001");
        assert_eq!(sale.sale.client_name.as_deref(), Some("Aya Benali"));
        assert_eq!(sale.sale.subtotal_cents, 18_000);
        assert_eq!(sale.sale.tax_amount_cents, 3_420);
        assert_eq!(sale.sale.total_cents, 21_420);
        assert_eq!(sale.lines.len(), 1);
        assert_eq!(sale.lines[0].total_cents, 18_000);

        // stock decremented through the ledger, cache and log agree
        assert_eq!(ledger.current_quantity(product).await.unwrap(), 48);
        assert_eq!(ledger.reconciled_quantity(product).await.unwrap(), 48);

        let movements = ledger.movements_for_product(product).await.unwrap();
        assert_eq!(movements[0].movement_type, MovementType::Sale);
        assert_eq!(movements[0].quantity, -2);
        assert_eq!(movements[0].reference.as_deref(), Some("INV-001"));
    }

    #[tokio::test]
    async fn test_sale_totals_reference_case() {
        let db = test_db().await;
        let engine = db.orders();

        let p1 = add_product(&db, "Article A", 10_000).await;
        let p2 = add_product(&db, "Article B", 5_000).await;

        let sale_id = engine
            .create_sale(&CreateSale {
                invoice_number: "INV-230".to_string(),
                lines: vec![
                    LineRequest::discounted(p1, 2, 10_000, 1000),
                    LineRequest::new(p2, 1, 5_000),
                ],
                tax_rate_bps: 1900,
                ..Default::default()
            })
            .await
            .unwrap();

        let sale = engine.get_sale(sale_id).await.unwrap().unwrap().sale;
        assert_eq!(sale.subtotal_cents, 23_000);
        assert_eq!(sale.tax_amount_cents, 4_370);
        assert_eq!(sale.total_cents, 27_370);
        // stored values satisfy the header invariant
        assert_eq!(
            sale.total_cents,
            sale.subtotal_cents + sale.tax_amount_cents - sale.discount_cents
        );
    }

    #[tokio::test]
    async fn test_failed_sale_leaves_no_rows() {
        let db = test_db().await;
        let engine = db.orders();
        let ledger = db.ledger();

        let product = add_product(&db, "Stylo", 1_000).await;
        ledger.adjust_stock(product, 10, None).await.unwrap();

        // second line references a product that does not exist
        let err = engine
            .create_sale(&CreateSale {
                invoice_number: "INV-BAD".to_string(),
                lines: vec![
                    LineRequest::new(product, 3, 1_000),
                    LineRequest::new(9_999, 1, 500),
                ],
                tax_rate_bps: 1900,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::ProductNotFound(9_999)));

        // zero rows: header, lines, movements all rolled back
        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(sales, 0);
        assert_eq!(items, 0);

        // the valid first line's stock decrement was rolled back too
        assert_eq!(ledger.current_quantity(product).await.unwrap(), 10);
        assert_eq!(ledger.reconciled_quantity(product).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_empty_order_rejected() {
        let db = test_db().await;

        let err = db
            .orders()
            .create_sale(&CreateSale {
                invoice_number: "INV-EMPTY".to_string(),
                tax_rate_bps: 1900,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::EmptyOrder));
    }

    #[tokio::test]
    async fn test_invalid_line_rejected_before_any_write() {
        let db = test_db().await;
        let product = add_product(&db, "Stylo", 1_000).await;

        let err = db
            .orders()
            .create_sale(&CreateSale {
                invoice_number: "INV-NEG".to_string(),
                lines: vec![LineRequest::new(product, -1, 1_000)],
                tax_rate_bps: 1900,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidLine { index: 0, .. }));

        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(sales, 0);
    }

    #[tokio::test]
    async fn test_duplicate_invoice_rejected() {
        let db = test_db().await;
        let engine = db.orders();
        let ledger = db.ledger();
        let product = add_product(&db, "Stylo", 1_000).await;

        let request = CreateSale {
            invoice_number: "INV-042".to_string(),
            lines: vec![LineRequest::new(product, 1, 1_000)],
            tax_rate_bps: 1900,
            ..Default::default()
        };

        engine.create_sale(&request).await.unwrap();
        let err = engine.create_sale(&request).await.unwrap_err();
        assert!(matches!(err, OrderError::DuplicateNumber(ref n) if n == "INV-042"));

        // the rejected retry changed nothing
        assert_eq!(ledger.current_quantity(product).await.unwrap(), -1);
        assert_eq!(ledger.reconciled_quantity(product).await.unwrap(), -1);
    }

    #[tokio::test]
    async fn test_oversell_goes_negative() {
        let db = test_db().await;
        let engine = db.orders();
        let ledger = db.ledger();
        let product = add_product(&db, "Stylo", 1_000).await;
        ledger.adjust_stock(product, 2, None).await.unwrap();

        // selling 5 with 2 in stock is permitted by policy
        engine
            .create_sale(&CreateSale {
                invoice_number: "INV-OVER".to_string(),
                lines: vec![LineRequest::new(product, 5, 1_000)],
                tax_rate_bps: 0,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(ledger.current_quantity(product).await.unwrap(), -3);
    }

    #[tokio::test]
    async fn test_create_purchase_end_to_end() {
        let db = test_db().await;
        let engine = db.orders();
        let ledger = db.ledger();
        let product = add_product(&db, "Ramette papier", 10_000).await;

        let purchase_id = engine
            .create_purchase(&CreatePurchase {
                reference: "PUR-001".to_string(),
                lines: vec![LineRequest::new(product, 20, 10_000)],
                tax_rate_bps: 1000,
                ..Default::default()
            })
            .await
            .unwrap();

        let purchase = engine.get_purchase(purchase_id).await.unwrap().unwrap();
        assert_eq!(purchase.purchase.subtotal_cents, 200_000);
        assert_eq!(purchase.purchase.tax_amount_cents, 20_000);
        assert_eq!(purchase.purchase.total_cents, 220_000);
        assert_eq!(purchase.lines.len(), 1);

        // stock increased by 20 with a single purchase movement
        assert_eq!(ledger.current_quantity(product).await.unwrap(), 20);
        let movements = ledger.movements_for_product(product).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::Purchase);
        assert_eq!(movements[0].quantity, 20);
    }

    #[tokio::test]
    async fn test_purchase_line_discount_rejected() {
        let db = test_db().await;
        let product = add_product(&db, "Stylo", 1_000).await;

        let err = db
            .orders()
            .create_purchase(&CreatePurchase {
                reference: "PUR-DISC".to_string(),
                lines: vec![LineRequest::discounted(product, 1, 1_000, 500)],
                tax_rate_bps: 1000,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidLine { index: 0, .. }));
    }

    #[tokio::test]
    async fn test_list_sales_with_limit() {
        let db = test_db().await;
        let engine = db.orders();
        let product = add_product(&db, "Stylo", 1_000).await;

        for i in 0..3 {
            engine
                .create_sale(&CreateSale {
                    invoice_number: format!("INV-{i:03}"),
                    lines: vec![LineRequest::new(product, 1, 1_000)],
                    tax_rate_bps: 1900,
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let all = engine.list_sales(&SaleFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let limited = engine
            .list_sales(&SaleFilter {
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
        // newest first
        assert_eq!(limited[0].invoice_number, "INV-002");
    }

    #[tokio::test]
    async fn test_list_sales_date_range() {
        let db = test_db().await;
        let engine = db.orders();
        let product = add_product(&db, "Stylo", 1_000).await;

        engine
            .create_sale(&CreateSale {
                invoice_number: "INV-TODAY".to_string(),
                lines: vec![LineRequest::new(product, 1, 1_000)],
                tax_rate_bps: 1900,
                ..Default::default()
            })
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let hits = engine
            .list_sales(&SaleFilter {
                from: Some(today),
                to: Some(today),
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let past = engine
            .list_sales(&SaleFilter {
                from: None,
                to: Some(today.pred_opt().unwrap()),
                limit: None,
            })
            .await
            .unwrap();
        assert!(past.is_empty());
    }

    #[tokio::test]
    async fn test_get_sale_missing_returns_none() {
        let db = test_db().await;
        assert!(db.orders().get_sale(123).await.unwrap().is_none());
        assert!(db.orders().get_purchase(123).await.unwrap().is_none());
    }

    #[test]
    fn test_generate_order_number_format() {
        let number = generate_order_number("INV");
        assert!(number.starts_with("INV-"));
        // INV-YYYYMMDD-NNNN
        assert_eq!(number.len(), "INV-20260826-0000".len());
    }
}
