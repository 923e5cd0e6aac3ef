use axum::routing::get;
use axum::Router;
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::core::state::AppState;
use crate::services::handlers::{discover_html, discover_json, register_device};

/// Build the application router.
///
/// Requests matching no route are served from `assets_dir`. Every response
/// carries permissive CORS headers.
pub fn create_router(state: AppState, assets_dir: &Path) -> Router {
    Router::new()
        .route("/", get(discover_html).post(register_device))
        .route("/devices.json", get(discover_json))
        .fallback_service(ServeDir::new(assets_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
