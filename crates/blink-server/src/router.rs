use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all endpoints.
///
/// `body_limit` caps whole request bodies and must leave room above the
/// upload limit for multipart framing.
pub fn build_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/upload", post(handler::upload_handler))
        .route("/uploads/:object_id", get(handler::object_handler))
        .route("/code/:code", get(handler::code_handler))
        .route("/health", get(handler::health_handler))
        .route("/info", get(handler::info_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
