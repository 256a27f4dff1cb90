//! Templar API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use templar_core::AppError;
use templar_infrastructure::InMemoryTemplarStore;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let app_state = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = api_services::connect_and_migrate(database_url).await?;
            if config.migrate_only {
                info!("database migrations applied successfully");
                return Ok(());
            }

            api_services::build_postgres_state(pool, config.features)
        }
        None => {
            warn!("DATABASE_URL is not set, using the in-memory store");
            let store = Arc::new(InMemoryTemplarStore::new());
            dev_seed::seed_in_memory(&store).await?;
            api_services::build_in_memory_state(store, config.features)
        }
    };

    info!(
        template_rbac = config.features.template_rbac,
        advanced_scheduling = config.features.advanced_scheduling,
        "feature set loaded"
    );

    let app = api_router::build_router(app_state);
    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "templar-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
