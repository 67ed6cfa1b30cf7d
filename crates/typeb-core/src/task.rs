use crate::error::{Result, TypebError};
use crate::io;
use crate::paths;
use crate::types::{Priority, TaskCategory, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub family_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: TaskCategory,
    pub priority: Priority,
    pub assignee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    /// Overrides the assignee's default offset for the initial reminder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_offset_minutes: Option<u32>,
    #[serde(default)]
    pub photo_required: bool,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    /// Reference to the validation photo (path or URL) when one was required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_ref: Option<String>,
}

/// Fields the caller chooses at creation time; the rest is filled in here.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category: TaskCategory,
    pub priority: Priority,
    pub assignee_id: String,
    pub due_at: Option<DateTime<Utc>>,
    pub reminder_offset_minutes: Option<u32>,
    pub photo_required: bool,
    pub created_by: String,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

// ---------------------------------------------------------------------------
// Per-family task file
// ---------------------------------------------------------------------------

/// Load the task list for a family. The family must exist; an absent tasks
/// file just means no tasks yet.
pub fn load_tasks(root: &Path, family_id: &str) -> Result<Vec<Task>> {
    if !paths::family_manifest(root, family_id).exists() {
        return Err(TypebError::FamilyNotFound(family_id.to_string()));
    }
    Ok(io::load_yaml(&paths::family_tasks(root, family_id))?.unwrap_or_default())
}

pub fn save_tasks(root: &Path, family_id: &str, tasks: &[Task]) -> Result<()> {
    io::save_yaml(&paths::family_tasks(root, family_id), &tasks)
}

// ---------------------------------------------------------------------------
// Task list operations (operate on a mutable Vec<Task>)
// ---------------------------------------------------------------------------

/// Add a task to the list. The assignee id is validated here, before anything
/// is written, so a bad id never leaves a half-created task behind.
pub fn add_task(tasks: &mut Vec<Task>, family_id: &str, new: NewTask) -> Result<Uuid> {
    paths::validate_id(&new.assignee_id)?;
    let id = Uuid::new_v4();
    tasks.push(Task {
        id,
        family_id: family_id.to_string(),
        title: new.title,
        description: new.description,
        category: new.category,
        priority: new.priority,
        assignee_id: new.assignee_id,
        due_at: new.due_at,
        reminder_offset_minutes: new.reminder_offset_minutes,
        photo_required: new.photo_required,
        status: TaskStatus::Pending,
        created_at: Utc::now(),
        created_by: new.created_by,
        completed_at: None,
        completed_by: None,
        photo_ref: None,
    });
    Ok(id)
}

/// Complete a task. Photo-validated tasks need a photo reference; tasks with
/// `photo_required = false` never do.
pub fn complete_task<'a>(
    tasks: &'a mut [Task],
    id: Uuid,
    user_id: &str,
    photo_ref: Option<String>,
) -> Result<&'a Task> {
    let task = find_mut(tasks, id)?;
    if task.status == TaskStatus::Completed {
        return Err(TypebError::InvalidTransition {
            from: "completed".to_string(),
            to: "completed".to_string(),
            reason: "task is already completed".to_string(),
        });
    }
    if task.photo_required && photo_ref.is_none() {
        return Err(TypebError::PhotoRequired);
    }
    task.status = TaskStatus::Completed;
    task.completed_at = Some(Utc::now());
    task.completed_by = Some(user_id.to_string());
    task.photo_ref = photo_ref;
    Ok(task)
}

pub fn reopen_task(tasks: &mut [Task], id: Uuid) -> Result<&Task> {
    let task = find_mut(tasks, id)?;
    if task.status == TaskStatus::Pending {
        return Err(TypebError::InvalidTransition {
            from: "pending".to_string(),
            to: "pending".to_string(),
            reason: "task is not completed".to_string(),
        });
    }
    task.status = TaskStatus::Pending;
    task.completed_at = None;
    task.completed_by = None;
    task.photo_ref = None;
    Ok(task)
}

/// Fields that can change after creation. `None` leaves a field alone; the
/// `clear_*` flags drop an optional field entirely (a cleared due date stops
/// the reminder ladder when the caller re-plans).
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<TaskCategory>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub clear_due_at: bool,
    pub reminder_offset_minutes: Option<u32>,
    pub clear_reminder_offset: bool,
    pub photo_required: Option<bool>,
}

/// Apply a patch to a pending task. Completed tasks must be reopened before
/// they can change; the caller re-plans reminders afterwards since the due
/// time, assignee, or offset may have moved.
pub fn edit_task(tasks: &mut [Task], id: Uuid, patch: TaskPatch) -> Result<&Task> {
    if let Some(assignee_id) = &patch.assignee_id {
        paths::validate_id(assignee_id)?;
    }
    let task = find_mut(tasks, id)?;
    if task.status == TaskStatus::Completed {
        return Err(TypebError::InvalidTransition {
            from: "completed".to_string(),
            to: "completed".to_string(),
            reason: "reopen the task before editing it".to_string(),
        });
    }
    if let Some(title) = patch.title {
        task.title = title;
    }
    if let Some(description) = patch.description {
        task.description = Some(description);
    }
    if let Some(category) = patch.category {
        task.category = category;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(assignee_id) = patch.assignee_id {
        task.assignee_id = assignee_id;
    }
    if patch.clear_due_at {
        task.due_at = None;
    } else if let Some(due_at) = patch.due_at {
        task.due_at = Some(due_at);
    }
    if patch.clear_reminder_offset {
        task.reminder_offset_minutes = None;
    } else if let Some(offset) = patch.reminder_offset_minutes {
        task.reminder_offset_minutes = Some(offset);
    }
    if let Some(photo_required) = patch.photo_required {
        task.photo_required = photo_required;
    }
    Ok(task)
}

/// Remove a task from the list, returning it.
pub fn remove_task(tasks: &mut Vec<Task>, id: Uuid) -> Result<Task> {
    let pos = tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| TypebError::TaskNotFound(id.to_string()))?;
    Ok(tasks.remove(pos))
}

pub fn find(tasks: &[Task], id: Uuid) -> Result<&Task> {
    tasks
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| TypebError::TaskNotFound(id.to_string()))
}

pub fn find_mut(tasks: &mut [Task], id: Uuid) -> Result<&mut Task> {
    tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| TypebError::TaskNotFound(id.to_string()))
}

/// Human-readable summary: "3/5 completed, 2 pending"
pub fn summarize(tasks: &[Task]) -> String {
    let total = tasks.len();
    let done = tasks.iter().filter(|t| t.is_completed()).count();
    format!("{done}/{total} completed, {} pending", total - done)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
