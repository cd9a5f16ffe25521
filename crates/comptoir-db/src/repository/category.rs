//! Category repository. Category names are unique; deleting a category
//! leaves its products uncategorized rather than deleting them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use comptoir_core::validation::validate_name;
use comptoir_core::{Category, NewCategory};

/// CRUD over product categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Adds a category and returns its id. Duplicate names are rejected
    /// with `UniqueViolation`.
    pub async fn add(&self, category: &NewCategory) -> DbResult<i64> {
        validate_name("name", &category.name)?;

        let result = sqlx::query(
            "INSERT INTO categories (name, description, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(category.name.trim())
        .bind(&category.description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, name = %category.name, "Category added");
        Ok(id)
    }

    /// Fetches one category.
    pub async fn get(&self, id: i64) -> DbResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Lists all categories, alphabetically.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name, id")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    /// Renames a category.
    pub async fn update(&self, id: i64, category: &NewCategory) -> DbResult<()> {
        validate_name("name", &category.name)?;

        let result = sqlx::query("UPDATE categories SET name = ?2, description = ?3 WHERE id = ?1")
            .bind(id)
            .bind(category.name.trim())
            .bind(&category.description)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }
        Ok(())
    }

    /// Deletes a category. Products keep existing with their category
    /// cleared (ON DELETE SET NULL).
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }
        debug!(id, "Category deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
