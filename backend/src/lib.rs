//! StockCare inventory platform - backend library
//!
//! Product catalog, stock movement ledger and reporting over an HTTP API.
//! The server binary wires these together; tests drive them directly.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::{Config, StorageBackend};
pub use error::{AppError, AppResult};
use store::{DynStore, MemoryStore, PgStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: DynStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Open the store selected by the configuration
pub async fn connect_store(config: &Config) -> AppResult<DynStore> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let url = config.database.url.as_deref().ok_or_else(|| {
                AppError::Configuration("database.url is required for the postgres backend".into())
            })?;

            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
                .connect(url)
                .await?;
            tracing::info!("Database connection established");

            let store = PgStore::new(db_pool);
            if config.database.run_migrations {
                tracing::info!("Running database migrations...");
                store.migrate().await?;
                tracing::info!("Migrations completed");
            }

            Ok(Arc::new(store))
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "StockCare Inventory API v1"
}
