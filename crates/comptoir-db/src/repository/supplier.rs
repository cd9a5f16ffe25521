//! Supplier repository. Mirrors the client repository; suppliers are
//! referenced by purchases instead of sales.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use comptoir_core::validation::validate_name;
use comptoir_core::{NewSupplier, Supplier};

/// CRUD and search over suppliers.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Adds a supplier and returns its id.
    pub async fn add(&self, supplier: &NewSupplier) -> DbResult<i64> {
        validate_name("name", &supplier.name)?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO suppliers (name, phone, email, address, tax_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(supplier.name.trim())
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(&supplier.tax_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, name = %supplier.name, "Supplier added");
        Ok(id)
    }

    /// Fetches one supplier.
    pub async fn get(&self, id: i64) -> DbResult<Supplier> {
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Lists all suppliers, alphabetically.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(suppliers)
    }

    /// Case-insensitive substring search over name and email.
    pub async fn search(&self, term: &str) -> DbResult<Vec<Supplier>> {
        let pattern = format!("%{}%", term);
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT * FROM suppliers
            WHERE name LIKE ?1 OR email LIKE ?1
            ORDER BY name, id
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(suppliers)
    }

    /// Updates a supplier in place.
    pub async fn update(&self, id: i64, supplier: &NewSupplier) -> DbResult<()> {
        validate_name("name", &supplier.name)?;

        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = ?2, phone = ?3, email = ?4, address = ?5, tax_id = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(supplier.name.trim())
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(&supplier.tax_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }
        Ok(())
    }

    /// Deletes a supplier. Blocked with `ForeignKeyViolation` if any
    /// purchase references it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }
        debug!(id, "Supplier deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::CreatePurchase;
    use crate::pool::{Database, DbConfig};
    use comptoir_core::{LineRequest, NewProduct};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_and_list_ordered_by_name() {
        let db = test_db().await;
        let repo = db.suppliers();

        repo.add(&NewSupplier {
            name: "Zidane Fournitures".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
        repo.add(&NewSupplier {
            name: "Atlas Papeterie".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Atlas Papeterie");
    }

    #[tokio::test]
    async fn test_delete_blocked_when_referenced_by_purchase() {
        let db = test_db().await;
        let supplier = db
            .suppliers()
            .add(&NewSupplier {
                name: "Atlas".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let product = db
            .products()
            .add(&NewProduct {
                name: "Ramette".to_string(),
                selling_price_cents: 1_000,
                ..Default::default()
            })
            .await
            .unwrap();

        db.orders()
            .create_purchase(&CreatePurchase {
                reference: "PUR-1".to_string(),
                supplier_id: Some(supplier),
                lines: vec![LineRequest::new(product, 5, 600)],
                tax_rate_bps: 1000,
                ..Default::default()
            })
            .await
            .unwrap();

        let err = db.suppliers().delete(supplier).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_supplier() {
        let db = test_db().await;
        let err = db.suppliers().delete(404).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
