//! Campus CMMS development REST server.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod state;

use std::sync::Arc;

use cmms_core::AppError;
use cmms_domain::EntityCatalog;
use cmms_infrastructure::InMemoryEntityCollectionApi;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let catalog = EntityCatalog::campus()?;
    let store = Arc::new(InMemoryEntityCollectionApi::new(&catalog));

    if config.dev_seed {
        let seeded = dev_seed::run(&store).await?;
        info!(records = seeded, "seeded development data");
    }

    let app = api_router::build_router(AppState { store }, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(%address, "cmms-api listening");
    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))
}
