//! Axum route handlers for the Optimization API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::optimization::cache::CacheStats;
use crate::optimization::models::{OptimizationRequest, OptimizationResult};
use crate::state::AppState;

/// POST /api/v1/optimize
///
/// Validates, serves from cache when fresh, otherwise rewrites through the provider.
pub async fn handle_optimize(
    State(state): State<AppState>,
    payload: Result<Json<OptimizationRequest>, JsonRejection>,
) -> Result<Json<OptimizationResult>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let request_id = Uuid::new_v4();
    let span = info_span!(
        "optimize",
        %request_id,
        kind = request.content_kind.as_str(),
        content_chars = request.raw_content.chars().count()
    );

    let result = state.optimizer.optimize(&request).instrument(span).await?;
    Ok(Json(result))
}

/// DELETE /api/v1/optimize/cache
pub async fn handle_clear_cache(State(state): State<AppState>) -> StatusCode {
    state.optimizer.clear_cache();
    StatusCode::NO_CONTENT
}

/// GET /api/v1/optimize/cache/stats
pub async fn handle_cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.optimizer.cache_stats())
}
