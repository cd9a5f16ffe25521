//! Client repository.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use comptoir_core::validation::validate_name;
use comptoir_core::{Client, NewClient};

/// CRUD and search over clients.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Adds a client and returns its id.
    pub async fn add(&self, client: &NewClient) -> DbResult<i64> {
        validate_name("name", &client.name)?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO clients (name, phone, email, address, tax_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(client.name.trim())
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.address)
        .bind(&client.tax_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, name = %client.name, "Client added");
        Ok(id)
    }

    /// Fetches one client.
    pub async fn get(&self, id: i64) -> DbResult<Client> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Client", id))
    }

    /// Lists all clients, alphabetically.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(clients)
    }

    /// Case-insensitive substring search over name and email.
    pub async fn search(&self, term: &str) -> DbResult<Vec<Client>> {
        let pattern = format!("%{}%", term);
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE name LIKE ?1 OR email LIKE ?1
            ORDER BY name, id
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    /// Updates a client in place.
    pub async fn update(&self, id: i64, client: &NewClient) -> DbResult<()> {
        validate_name("name", &client.name)?;

        let result = sqlx::query(
            r#"
            UPDATE clients
            SET name = ?2, phone = ?3, email = ?4, address = ?5, tax_id = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(client.name.trim())
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.address)
        .bind(&client.tax_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }
        Ok(())
    }

    /// Deletes a client. Blocked with `ForeignKeyViolation` if any sale
    /// references it; sales history is never cascaded away.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }
        debug!(id, "Client deleted");
        Ok(())
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
    use comptoir_core::{LineRequest, NewProduct};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_get_update_delete() {
        let db = test_db().await;
        let repo = db.clients();

        let id = repo
            .add(&NewClient {
                name: "Aya Benali".to_string(),
                email: Some("aya@example.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let client = repo.get(id).await.unwrap();
        assert_eq!(client.name, "Aya Benali");

        repo.update(
            id,
            &NewClient {
                name: "Aya B.".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(repo.get(id).await.unwrap().name, "Aya B.");

        repo.delete(id).await.unwrap();
        assert!(matches!(
            repo.get(id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let db = test_db().await;
        let err = db
            .clients()
            .add(&NewClient {
                name: "   ".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_search_matches_name_and_email() {
        let db = test_db().await;
        let repo = db.clients();
        repo.add(&NewClient {
            name: "Aya Benali".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
        repo.add(&NewClient {
            name: "Karim".to_string(),
            email: Some("karim@benali.dz".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
        repo.add(&NewClient {
            name: "Nora".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        let hits = repo.search("benali").await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_blocked_when_referenced_by_sale() {
        let db = test_db().await;
        let client = db
            .clients()
            .add(&NewClient {
                name: "Aya".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let product = db
            .products()
            .add(&NewProduct {
                name: "Stylo".to_string(),
                selling_price_cents: 1_000,
                ..Default::default()
            })
            .await
            .unwrap();

        db.orders()
            .create_sale(&CreateSale {
                invoice_number: "INV-1".to_string(),
                client_id: Some(client),
                lines: vec![LineRequest::new(product, 1, 1_000)],
                tax_rate_bps: 1900,
                ..Default::default()
            })
            .await
            .unwrap();

        let err = db.clients().delete(client).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        // history intact
        assert_eq!(db.clients().get(client).await.unwrap().name, "Aya");
    }
}
