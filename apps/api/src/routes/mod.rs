pub mod health;

use axum::{
    http::Uri,
    routing::{delete, get, post},
    Router,
};

use crate::errors::AppError;
use crate::optimization::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Optimization API
        .route("/api/v1/optimize", post(handlers::handle_optimize))
        .route("/api/v1/optimize/cache", delete(handlers::handle_clear_cache))
        .route(
            "/api/v1/optimize/cache/stats",
            get(handlers::handle_cache_stats),
        )
        .fallback(not_found)
        .with_state(state)
}
