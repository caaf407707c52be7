//! Link models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Link entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub collection_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request for link creation
///
/// `collection_id` stays a string here; an id that does not parse as a UUID
/// is handled by the handler as not-found rather than a deserialization
/// rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub url: Option<String>,
    pub collection_id: Option<String>,
}
