use axum::Router;
use axum::routing::{get, post, put};
use cmms_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod cors;

#[cfg(test)]
mod tests;

/// Builds the REST surface over the in-memory collection store.
///
/// `/api/health` and `/api/import` are static routes and take priority over
/// the `/api/{collection}` capture.
pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    Ok(Router::new()
        .route("/api/health", get(handlers::health::health_handler))
        .route("/api/import", post(handlers::import::import_records_handler))
        .route(
            "/api/{collection}",
            get(handlers::records::list_records_handler)
                .post(handlers::records::create_record_handler),
        )
        .route(
            "/api/{collection}/{record_id}",
            put(handlers::records::update_record_handler)
                .delete(handlers::records::delete_record_handler),
        )
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
