use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::optimization::error::OptimizeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Optimize(#[from] OptimizeError),
}

/// HTTP status for each optimization failure.
fn optimize_status(err: &OptimizeError) -> StatusCode {
    match err {
        OptimizeError::InvalidInput
        | OptimizeError::ContentTooLong { .. }
        | OptimizeError::MissingContext => StatusCode::BAD_REQUEST,
        OptimizeError::ApiKeyMissing | OptimizeError::EndpointMissing => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        OptimizeError::QuotaExceeded(_) => StatusCode::PAYMENT_REQUIRED,
        OptimizeError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        OptimizeError::InvalidApiKey | OptimizeError::Api { .. } | OptimizeError::Parse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Optimize(e) => {
                if e.is_local() {
                    tracing::debug!("Rejected optimization request: {e}");
                } else {
                    tracing::error!("Optimization failed: {e}");
                }
                (optimize_status(e), e.code(), e.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
