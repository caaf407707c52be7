use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod jwt;
mod metadata;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;
mod validation;

use common::database::{DatabaseConfig, health_check, init_pool};

use crate::{
    jwt::{JwtConfig, JwtService},
    metadata::MetadataExtractor,
    repositories::{CollectionRepository, LinkRepository, UserRepository},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Kolekt API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Apply pending migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Initialize JWT service
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config);

    let user_repository = UserRepository::new(pool.clone());
    let collection_repository = CollectionRepository::new(pool.clone());
    let link_repository = LinkRepository::new(pool.clone());
    let metadata_extractor = MetadataExtractor::new()?;

    info!("Kolekt API service initialized successfully");

    let app_state = AppState {
        db_pool: pool,
        jwt_service,
        user_repository,
        collection_repository,
        link_repository,
        metadata_extractor,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Kolekt API service listening on 0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
