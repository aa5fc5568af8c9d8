use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

/// Build and configure the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/hello/{mode}", get(handlers::hello))
        .route("/cache/{key}", get(handlers::lookup))
        .route("/metrics", get(handlers::metrics))
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
