use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use typeb_core::escalation::{self, EntryStatus, ReminderEntry, TickReport};
use typeb_core::TypebError;

#[derive(serde::Deserialize)]
pub struct ReminderQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub task_id: Option<Uuid>,
}

/// GET /api/reminders: inspect the escalation ledger.
pub async fn list_reminders(
    State(app): State<AppState>,
    Query(query): Query<ReminderQuery>,
) -> Result<Json<Vec<ReminderEntry>>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(EntryStatus::from_str)
        .transpose()
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let root = app.root.clone();
    let entries =
        tokio::task::spawn_blocking(move || escalation::list(&root, status, query.task_id))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(entries))
}

#[derive(serde::Deserialize, Default)]
pub struct TickBody {
    /// Fire as of this instant instead of the wall clock.
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

/// POST /api/reminders/tick: fire everything that has come due. The body
/// is optional; an empty request ticks as of the wall clock.
pub async fn tick(
    State(app): State<AppState>,
    body: axum::body::Bytes,
) -> Result<Json<TickReport>, AppError> {
    let parsed: TickBody = if body.is_empty() {
        TickBody::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::bad_request(e.to_string()))?
    };
    let now = parsed.at.unwrap_or_else(Utc::now);
    let root = app.root.clone();
    let sink = app.sink.clone();
    let report = tokio::task::spawn_blocking(move || {
        Ok::<_, TypebError>(escalation::tick(&root, now, sink.as_ref())?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(report))
}
