use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version plus the completion provider and model in use.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "mockmate-api",
        "provider": state.orchestrator.provider_name(),
        "model": state.config.model,
        "timeout_ms": state.config.timeout_ms,
    }))
}
