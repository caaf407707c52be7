//! Application state shared across handlers

use sqlx::PgPool;

use crate::{
    jwt::JwtService,
    metadata::MetadataExtractor,
    repositories::{CollectionRepository, LinkRepository, UserRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub collection_repository: CollectionRepository,
    pub link_repository: LinkRepository,
    pub metadata_extractor: MetadataExtractor,
}
