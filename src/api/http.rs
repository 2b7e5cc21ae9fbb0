//! HTTP server setup with Axum

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::websocket::handler::{client_page, data_source_handler};
use super::websocket::page::{DATA_SOURCE_PATH, HEALTH_PATH};
use super::websocket::state::WsState;

/// Create the Axum router: feed, dashboard page and health check
pub fn create_router(state: WsState) -> Router {
    // Dashboard may be opened from another origin during development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let endpoint = state.settings.endpoint.clone();

    Router::new()
        .route(DATA_SOURCE_PATH, get(data_source_handler))
        .route(&endpoint, get(client_page))
        .route(HEALTH_PATH, get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
