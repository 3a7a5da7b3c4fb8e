use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::optimization::validator::is_placeholder_key;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "rankkit-api",
        "llm_configured": !is_placeholder_key(&state.config.llm.api_key),
    }))
}
