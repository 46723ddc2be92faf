//! Route handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use super::server::AppState;

/// Liveness report — the only externally reachable surface.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let now = chrono::Utc::now().with_timezone(&state.timezone);
    Json(serde_json::json!({
        "status": "Certificate generation service is running",
        "service": "certpost",
        "version": env!("CARGO_PKG_VERSION"),
        "time": now.to_rfc3339(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}
