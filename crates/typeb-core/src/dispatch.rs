//! Notification dispatch seam.
//!
//! Delivery rides on a managed platform service and is fire-and-forget:
//! no retry, no acknowledgment, no offline queue. A sink failure is the
//! caller's to log and move past.

use crate::error::Result;
use crate::task::Task;
use crate::types::ReminderLevel;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub entry_id: Uuid,
    pub task_id: Uuid,
    pub recipient_id: String,
    pub level: ReminderLevel,
    pub title: String,
    pub body: String,
}

impl Notification {
    /// Build level-appropriate copy for a reminder about `task`.
    pub fn render(entry_id: Uuid, task: &Task, level: ReminderLevel, recipient_id: &str) -> Self {
        let due = task
            .due_at
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "soon".to_string());
        let (title, body) = match level {
            ReminderLevel::Initial => (
                format!("Reminder: {}", task.title),
                format!("Due at {due}."),
            ),
            ReminderLevel::FollowUp => (
                format!("Still pending: {}", task.title),
                format!("Due at {due}. Don't forget."),
            ),
            ReminderLevel::FinalCall => (
                format!("Final call: {}", task.title),
                format!("Due at {due}. This is the last reminder."),
            ),
            ReminderLevel::ManagerAlert => (
                format!("Missed task: {}", task.title),
                format!(
                    "{} did not complete '{}' by {due}.",
                    task.assignee_id, task.title
                ),
            ),
        };
        Self {
            entry_id,
            task_id: task.id,
            recipient_id: recipient_id.to_string(),
            level,
            title,
            body,
        }
    }
}

/// Where fired reminders go. Implementations wrap the platform notification
/// API; tests capture in memory.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<()>;
}

/// Stand-in for the managed push/local-notification API: logs the payload.
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, n: &Notification) -> Result<()> {
        tracing::info!(
            recipient = %n.recipient_id,
            task = %n.task_id,
            level = %n.level,
            "{}: {}",
            n.title,
            n.body
        );
        Ok(())
    }
}

/// In-memory capture for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("sink lock poisoned").clone()
    }
}

impl NotificationSink for MemorySink {
    fn deliver(&self, n: &Notification) -> Result<()> {
        self.sent.lock().expect("sink lock poisoned").push(n.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
