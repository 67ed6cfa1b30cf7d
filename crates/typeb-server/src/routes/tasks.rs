use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use typeb_core::config::Config;
use typeb_core::task::{self, NewTask, Task};
use typeb_core::types::{Priority, TaskCategory, TaskStatus};
use typeb_core::{escalation, TypebError};

#[derive(serde::Deserialize)]
pub struct AddTaskBody {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: TaskCategory,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    pub assignee_id: String,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reminder_offset_minutes: Option<u32>,
    #[serde(default)]
    pub photo_required: bool,
    pub created_by: String,
}

fn default_priority() -> Priority {
    Priority::Medium
}

/// POST /api/families/:id/tasks: add a task and plan its reminders.
pub async fn add_task(
    State(app): State<AppState>,
    Path(family_id): Path<String>,
    Json(body): Json<AddTaskBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut tasks = task::load_tasks(&root, &family_id)?;
        let id = task::add_task(
            &mut tasks,
            &family_id,
            NewTask {
                title: body.title,
                description: body.description,
                category: body.category,
                priority: body.priority,
                assignee_id: body.assignee_id,
                due_at: body.due_at,
                reminder_offset_minutes: body.reminder_offset_minutes,
                photo_required: body.photo_required,
                created_by: body.created_by,
            },
        )?;
        task::save_tasks(&root, &family_id, &tasks)?;

        let config = Config::load(&root)?;
        let created = task::find(&tasks, id)?;
        let planned = escalation::plan_for_task(&root, created, &config, Utc::now())?;

        Ok::<_, TypebError>(serde_json::json!({
            "family_id": family_id,
            "task_id": id,
            "reminders_planned": planned.len(),
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct TaskQuery {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub assignee: Option<String>,
}

/// GET /api/families/:id/tasks: list a family's tasks, optionally filtered
/// by status and/or assignee.
pub async fn list_tasks(
    State(app): State<AppState>,
    Path(family_id): Path<String>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Vec<Task>>, AppError> {
    let root = app.root.clone();
    let tasks = tokio::task::spawn_blocking(move || {
        let mut tasks = task::load_tasks(&root, &family_id)?;
        if let Some(status) = query.status {
            tasks.retain(|t| t.status == status);
        }
        if let Some(assignee) = &query.assignee {
            tasks.retain(|t| &t.assignee_id == assignee);
        }
        Ok::<_, TypebError>(tasks)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(tasks))
}

#[derive(serde::Deserialize)]
pub struct CompleteTaskBody {
    pub user_id: String,
    #[serde(default)]
    pub photo_ref: Option<String>,
}

/// POST /api/families/:id/tasks/:task_id/complete: complete a task and
/// cancel its pending reminders.
pub async fn complete_task(
    State(app): State<AppState>,
    Path((family_id, task_id)): Path<(String, Uuid)>,
    Json(body): Json<CompleteTaskBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut tasks = task::load_tasks(&root, &family_id)?;
        task::complete_task(&mut tasks, task_id, &body.user_id, body.photo_ref)?;
        task::save_tasks(&root, &family_id, &tasks)?;
        let cancelled = escalation::cancel_for_task(&root, task_id)?;

        Ok::<_, TypebError>(serde_json::json!({
            "family_id": family_id,
            "task_id": task_id,
            "status": "completed",
            "reminders_cancelled": cancelled,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/families/:id/tasks/:task_id: delete a task and cancel its
/// pending reminders.
pub async fn delete_task(
    State(app): State<AppState>,
    Path((family_id, task_id)): Path<(String, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut tasks = task::load_tasks(&root, &family_id)?;
        task::remove_task(&mut tasks, task_id)?;
        task::save_tasks(&root, &family_id, &tasks)?;
        let cancelled = escalation::cancel_for_task(&root, task_id)?;

        Ok::<_, TypebError>(serde_json::json!({
            "family_id": family_id,
            "task_id": task_id,
            "deleted": true,
            "reminders_cancelled": cancelled,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
