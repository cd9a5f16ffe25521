//! Product repository.
//!
//! Reads always join the category name for display. Updates deliberately
//! exclude `stock_quantity`: that column belongs to the stock ledger, and
//! editing a product must never silently change its stock.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use comptoir_core::validation::{validate_name, validate_price_cents, validate_selling_price_cents};
use comptoir_core::{NewProduct, Product};

const SELECT_PRODUCT: &str = r#"
    SELECT p.id, p.name, p.description, p.category_id, c.name AS category_name,
           p.purchase_price_cents, p.selling_price_cents,
           p.stock_quantity, p.min_stock, p.barcode,
           p.created_at, p.updated_at
    FROM products p
    LEFT JOIN categories c ON p.category_id = c.id
"#;

/// CRUD, search and low-stock listing over products.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Adds a product and returns its id. Stock starts at zero; initial
    /// inventory enters through the ledger, not here.
    pub async fn add(&self, product: &NewProduct) -> DbResult<i64> {
        validate_name("name", &product.name)?;
        validate_price_cents(product.purchase_price_cents)?;
        validate_selling_price_cents(product.selling_price_cents)?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO products
                (name, description, category_id,
                 purchase_price_cents, selling_price_cents,
                 stock_quantity, min_stock, barcode, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(product.name.trim())
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.purchase_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.min_stock)
        .bind(&product.barcode)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, name = %product.name, "Product added");
        Ok(id)
    }

    /// Fetches one product with its category name.
    pub async fn get(&self, id: i64) -> DbResult<Product> {
        let query = format!("{SELECT_PRODUCT} WHERE p.id = ?1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Lists all products, alphabetically.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let query = format!("{SELECT_PRODUCT} ORDER BY p.name, p.id");
        let products = sqlx::query_as::<_, Product>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Case-insensitive substring search over name and barcode.
    pub async fn search(&self, term: &str) -> DbResult<Vec<Product>> {
        let query = format!(
            "{SELECT_PRODUCT} WHERE p.name LIKE ?1 OR p.barcode LIKE ?1 ORDER BY p.name, p.id"
        );
        let products = sqlx::query_as::<_, Product>(&query)
            .bind(format!("%{}%", term))
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Products at or below their low-stock threshold, emptiest first.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let query = format!(
            "{SELECT_PRODUCT} WHERE p.stock_quantity <= p.min_stock ORDER BY p.stock_quantity, p.id"
        );
        let products = sqlx::query_as::<_, Product>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Updates a product's descriptive fields and prices. Does not touch
    /// `stock_quantity`.
    pub async fn update(&self, id: i64, product: &NewProduct) -> DbResult<()> {
        validate_name("name", &product.name)?;
        validate_price_cents(product.purchase_price_cents)?;
        validate_selling_price_cents(product.selling_price_cents)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?2, description = ?3, category_id = ?4,
                purchase_price_cents = ?5, selling_price_cents = ?6,
                min_stock = ?7, barcode = ?8, updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(product.name.trim())
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.purchase_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.min_stock)
        .bind(&product.barcode)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Deletes a product. Blocked with `ForeignKeyViolation` while any sale
    /// line, purchase line or stock movement references it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        debug!(id, "Product deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
