//! Collection models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::Link;

/// Collection entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: Uuid,
    pub title: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Collection with its links nested, newest first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionWithLinks {
    pub id: Uuid,
    pub title: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub links: Vec<Link>,
}

impl CollectionWithLinks {
    pub fn new(collection: Collection, links: Vec<Link>) -> Self {
        Self {
            id: collection.id,
            title: collection.title,
            user_id: collection.user_id,
            created_at: collection.created_at,
            links,
        }
    }
}

/// Request for collection creation
#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub title: Option<String>,
}
