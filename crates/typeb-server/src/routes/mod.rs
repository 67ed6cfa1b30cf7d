pub mod families;
pub mod reminders;
pub mod tasks;
pub mod webhook;

use axum::Json;

/// GET /api/health: liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
