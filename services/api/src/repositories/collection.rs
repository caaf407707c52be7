//! Collection repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::Collection;

/// Collection repository; all operations are scoped to the owning user
#[derive(Clone)]
pub struct CollectionRepository {
    pool: PgPool,
}

impl CollectionRepository {
    /// Create a new collection repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a collection owned by `user_id`
    pub async fn create(&self, user_id: Uuid, title: &str) -> Result<Collection> {
        info!("Creating collection for user {}", user_id);

        let row = sqlx::query(
            r#"
            INSERT INTO collections (title, user_id)
            VALUES ($1, $2)
            RETURNING id, title, user_id, created_at
            "#,
        )
        .bind(title)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::from_row(&row))
    }

    /// List collections owned by `user_id`, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Collection>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, user_id, created_at
            FROM collections
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::from_row).collect())
    }

    /// Find a collection by id, but only if it is owned by `user_id`
    ///
    /// A collection owned by another user resolves to `None`, same as one
    /// that does not exist.
    pub async fn find_owned(&self, user_id: Uuid, collection_id: Uuid) -> Result<Option<Collection>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, user_id, created_at
            FROM collections
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(collection_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::from_row))
    }

    /// Delete a collection owned by `user_id`; its links cascade
    ///
    /// The ownership filter and the delete are a single statement, so the
    /// match-and-delete is atomic. Returns false when nothing matched.
    pub async fn delete_owned(&self, user_id: Uuid, collection_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM collections
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(collection_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn from_row(row: &sqlx::postgres::PgRow) -> Collection {
        Collection {
            id: row.get("id"),
            title: row.get("title"),
            user_id: row.get("user_id"),
            created_at: row.get("created_at"),
        }
    }
}
