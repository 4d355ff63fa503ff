use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn create_health_router() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// GET /api/health
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.config.environment,
        "storage": state.vehicles.backend_name(),
    }))
}
