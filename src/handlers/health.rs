use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use crate::AppState;

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(health_check))
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
