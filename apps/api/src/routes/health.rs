use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service version plus which embedding provider is wired in.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "talentrank",
        "embedding": {
            "provider": state.embeddings.provider_name(),
            "dimension": state.embeddings.dimension(),
            "degradedMode": state.embeddings.degraded_mode()
        }
    }))
}
