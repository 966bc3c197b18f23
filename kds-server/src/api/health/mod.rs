//! Health check

use axum::{Json, Router, extract::State, routing::get};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "active_orders": state.manager.active_orders().len(),
        "connected_sessions": state.bus.session_count(),
    }))
}
