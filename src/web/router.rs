//! Router configuration for the web pages and relay endpoint.

use std::path::Path;
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{generate_room, share_screen, view_screen, AppState};
use super::middleware::security_headers;
use super::ws::relay_ws_handler;

/// Create the main router: pages plus the relay WebSocket endpoint.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let page_routes = Router::new()
        .route("/", get(generate_room))
        .route("/share/:room_id", get(share_screen))
        .route("/view/:room_id", get(view_screen))
        .layer(middleware::from_fn(security_headers));

    Router::new()
        .merge(page_routes)
        .route("/ws/:room_id", get(relay_ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create a router serving `static_path` under `/static`.
///
/// Returns None if the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    if !Path::new(static_path).is_dir() {
        tracing::warn!("Static directory not found: {}", static_path);
        return None;
    }
    Some(Router::new().nest_service("/static", ServeDir::new(static_path)))
}
