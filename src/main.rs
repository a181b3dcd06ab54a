mod config;
mod dto;
mod handlers;
mod interceptors;
mod middleware;
mod models;
mod routes;
mod services;
mod store;
mod utils;

use std::sync::Arc;

use config::{AppConfig, AppState, DatabaseConfig};
use middleware::setup_logging;
use routes::create_router;
use store::SqliteEntryStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    setup_logging();

    tracing::info!("Starting application...");

    // Load configurations
    let app_config = AppConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;

    tracing::info!("Loaded configuration for environment: {}", app_config.environment);

    // Create database connection pool and apply schema
    let db_pool = db_config.create_pool().await?;
    config::database::run_migrations(&db_pool).await?;
    tracing::info!("Database ready at {}", db_config.url);

    // Create AppState with the sqlite-backed entry store
    let store = Arc::new(SqliteEntryStore::new(db_pool));
    let app_state = AppState::new(store, app_config.clone());

    // Create router
    let app = create_router(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = app_config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        "{} v{} is running on {}",
        app_config.app_name,
        app_config.app_version,
        addr
    );

    axum::serve(listener, app).await?;

    Ok(())
}
