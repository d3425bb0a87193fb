//! HTTP router construction.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/queue/status", get(api::queue_status))
        .route("/scheduler/status", get(api::scheduler_status))
        .route("/webhook", post(api::webhook))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
