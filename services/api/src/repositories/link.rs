//! Link repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::Link;

/// Link repository; a link's effective owner is its collection's owner
#[derive(Clone)]
pub struct LinkRepository {
    pool: PgPool,
}

impl LinkRepository {
    /// Create a new link repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a link inside a collection
    ///
    /// Ownership of the collection must already have been verified by the
    /// caller.
    pub async fn create(
        &self,
        collection_id: Uuid,
        url: &str,
        title: &str,
        description: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Link> {
        info!("Saving link into collection {}", collection_id);

        let row = sqlx::query(
            r#"
            INSERT INTO links (url, title, description, image_url, collection_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, url, title, description, image_url, collection_id, created_at
            "#,
        )
        .bind(url)
        .bind(title)
        .bind(description)
        .bind(image_url)
        .bind(collection_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::from_row(&row))
    }

    /// List links belonging to any of the given collections, newest first
    pub async fn list_for_collections(&self, collection_ids: &[Uuid]) -> Result<Vec<Link>> {
        if collection_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, url, title, description, image_url, collection_id, created_at
            FROM links
            WHERE collection_id = ANY($1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(collection_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::from_row).collect())
    }

    /// Delete a link whose parent collection is owned by `user_id`
    ///
    /// The ownership filter joins through the collection in the same delete
    /// statement. Returns false when nothing matched, whether the link is
    /// absent or owned by someone else.
    pub async fn delete_owned(&self, user_id: Uuid, link_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM links
            USING collections
            WHERE links.id = $1
              AND links.collection_id = collections.id
              AND collections.user_id = $2
            "#,
        )
        .bind(link_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn from_row(row: &sqlx::postgres::PgRow) -> Link {
        Link {
            id: row.get("id"),
            url: row.get("url"),
            title: row.get("title"),
            description: row.get("description"),
            image_url: row.get("image_url"),
            collection_id: row.get("collection_id"),
            created_at: row.get("created_at"),
        }
    }
}
