//! Escalation ledger: the persisted reminder schedule.
//!
//! Layout:
//!   .typeb/schedule.yaml   every reminder entry ever planned
//!
//! Invariant: at most one active (Scheduled) set of entries per incomplete
//! task. Re-planning a task cancels its previous entries first.
//!
//! Firing is fire-and-forget: a sink failure is logged and the entry is
//! still marked Fired. There is no retry, backoff, or dead-letter queue.

use crate::config::Config;
use crate::dispatch::{Notification, NotificationSink};
use crate::error::{Result, TypebError};
use crate::family::Family;
use crate::io;
use crate::paths;
use crate::prefs::UserPrefs;
use crate::schedule::compute_schedule;
use crate::task::{self, Task};
use crate::types::ReminderLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Scheduled,
    Fired,
    Suppressed,
    Cancelled,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryStatus::Scheduled => "scheduled",
            EntryStatus::Fired => "fired",
            EntryStatus::Suppressed => "suppressed",
            EntryStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = TypebError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scheduled" => Ok(EntryStatus::Scheduled),
            "fired" => Ok(EntryStatus::Fired),
            "suppressed" => Ok(EntryStatus::Suppressed),
            "cancelled" => Ok(EntryStatus::Cancelled),
            _ => Err(TypebError::InvalidValue(format!(
                "unknown entry status '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderEntry {
    pub id: Uuid,
    pub task_id: Uuid,
    pub family_id: String,
    pub recipient_id: String,
    pub level: ReminderLevel,
    pub fire_at: DateTime<Utc>,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fired_at: Option<DateTime<Utc>>,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TickReport {
    pub fired: usize,
    pub suppressed: usize,
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// Internal file I/O
// ---------------------------------------------------------------------------

fn load_all(root: &Path) -> Result<Vec<ReminderEntry>> {
    Ok(io::load_yaml(&paths::schedule_path(root))?.unwrap_or_default())
}

fn save_all(root: &Path, entries: &[ReminderEntry]) -> Result<()> {
    io::save_yaml(&paths::schedule_path(root), &entries)
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Plan reminders for a task, replacing any entries still scheduled for it.
///
/// Pre-due rungs address the assignee; the manager alert fans out to every
/// parent in the family. Returns the entries that were inserted.
pub fn plan_for_task(
    root: &Path,
    task: &Task,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<Vec<ReminderEntry>> {
    let family = Family::load(root, &task.family_id)?;
    let prefs = UserPrefs::load_or_default(root, &task.assignee_id, config)?;
    let planned = compute_schedule(task, &prefs, config, now);

    let mut entries = load_all(root)?;
    for entry in entries
        .iter_mut()
        .filter(|e| e.task_id == task.id && e.status == EntryStatus::Scheduled)
    {
        entry.status = EntryStatus::Cancelled;
    }

    let mut inserted = Vec::new();
    for reminder in planned {
        let recipients: Vec<String> = if reminder.level.targets_parents() {
            family.parents().iter().map(|p| p.id.clone()).collect()
        } else {
            vec![task.assignee_id.clone()]
        };
        for recipient_id in recipients {
            inserted.push(ReminderEntry {
                id: Uuid::new_v4(),
                task_id: task.id,
                family_id: task.family_id.clone(),
                recipient_id,
                level: reminder.level,
                fire_at: reminder.fire_at,
                status: EntryStatus::Scheduled,
                created_at: now,
                fired_at: None,
            });
        }
    }

    entries.extend(inserted.iter().cloned());
    save_all(root, &entries)?;
    Ok(inserted)
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cancel every not-yet-fired entry for a task. Returns how many were
/// cancelled. Called on completion and deletion.
pub fn cancel_for_task(root: &Path, task_id: Uuid) -> Result<usize> {
    let mut entries = load_all(root)?;
    let mut cancelled = 0;
    for entry in entries
        .iter_mut()
        .filter(|e| e.task_id == task_id && e.status == EntryStatus::Scheduled)
    {
        entry.status = EntryStatus::Cancelled;
        cancelled += 1;
    }
    if cancelled > 0 {
        save_all(root, &entries)?;
    }
    Ok(cancelled)
}

/// Cancel scheduled entries addressed to a user within one family. Used when
/// a member is removed.
pub fn cancel_for_recipient(root: &Path, family_id: &str, user_id: &str) -> Result<usize> {
    let mut entries = load_all(root)?;
    let mut cancelled = 0;
    for entry in entries.iter_mut().filter(|e| {
        e.family_id == family_id && e.recipient_id == user_id && e.status == EntryStatus::Scheduled
    }) {
        entry.status = EntryStatus::Cancelled;
        cancelled += 1;
    }
    if cancelled > 0 {
        save_all(root, &entries)?;
    }
    Ok(cancelled)
}

// ---------------------------------------------------------------------------
// Firing
// ---------------------------------------------------------------------------

/// Fire every scheduled entry whose time has come.
///
/// The task is reloaded at fire time: completed or vanished tasks suppress
/// the entry (no escalation ever fires after completion). Everything else
/// goes to the sink; a delivery error is logged at warn and the entry is
/// still marked Fired.
pub fn tick(root: &Path, now: DateTime<Utc>, sink: &dyn NotificationSink) -> Result<TickReport> {
    let mut entries = load_all(root)?;
    let mut report = TickReport::default();
    let mut dirty = false;

    for entry in entries
        .iter_mut()
        .filter(|e| e.status == EntryStatus::Scheduled && e.fire_at <= now)
    {
        dirty = true;
        let current = match task::load_tasks(root, &entry.family_id) {
            Ok(tasks) => tasks.into_iter().find(|t| t.id == entry.task_id),
            Err(TypebError::FamilyNotFound(_)) => None,
            Err(e) => return Err(e),
        };

        match current {
            Some(task) if !task.is_completed() => {
                let notification =
                    Notification::render(entry.id, &task, entry.level, &entry.recipient_id);
                if let Err(e) = sink.deliver(&notification) {
                    tracing::warn!(
                        entry = %entry.id,
                        task = %entry.task_id,
                        "notification delivery failed, moving on: {e}"
                    );
                    report.failed += 1;
                }
                entry.status = EntryStatus::Fired;
                entry.fired_at = Some(now);
                report.fired += 1;
            }
            _ => {
                entry.status = EntryStatus::Suppressed;
                report.suppressed += 1;
            }
        }
    }

    if dirty {
        save_all(root, &entries)?;
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// List ledger entries, optionally filtered by status and/or task.
pub fn list(
    root: &Path,
    status: Option<EntryStatus>,
    task_id: Option<Uuid>,
) -> Result<Vec<ReminderEntry>> {
    let mut entries = load_all(root)?;
    if let Some(s) = status {
        entries.retain(|e| e.status == s);
    }
    if let Some(id) = task_id {
        entries.retain(|e| e.task_id == id);
    }
    entries.sort_by(|a, b| a.fire_at.cmp(&b.fire_at));
    Ok(entries)
}

pub fn get(root: &Path, id: Uuid) -> Result<ReminderEntry> {
    load_all(root)?
        .into_iter()
        .find(|e| e.id == id)
        .ok_or_else(|| TypebError::EntryNotFound(id.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MemorySink;
    use crate::task::NewTask;
    use crate::types::{Priority, TaskCategory};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn dt(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap()
    }

    /// Family "smith" with parent "mom", child "kid-1", and one pending task
    /// due at 12:00 with the default 30-minute offset.
    fn setup(dir: &TempDir) -> Task {
        let config = Config::default();
        let family = crate::family::create(dir.path(), "smith", "Smiths", "mom", "Mom").unwrap();
        crate::family::join(dir.path(), &family.invite_code, "kid-1", "Kid", &config).unwrap();

        let mut tasks = task::load_tasks(dir.path(), "smith").unwrap();
        let id = task::add_task(
            &mut tasks,
            "smith",
            NewTask {
                title: "Homework".to_string(),
                description: None,
                category: TaskCategory::Homework,
                priority: Priority::Medium,
                assignee_id: "kid-1".to_string(),
                due_at: Some(dt(12, 0)),
                reminder_offset_minutes: None,
                photo_required: false,
                created_by: "mom".to_string(),
            },
        )
        .unwrap();
        task::save_tasks(dir.path(), "smith", &tasks).unwrap();
        tasks.into_iter().find(|t| t.id == id).unwrap()
    }

    /// Sink that always fails, to exercise the fire-and-forget path.
    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn deliver(&self, _n: &Notification) -> Result<()> {
            Err(TypebError::InvalidValue("push service down".to_string()))
        }
    }

    #[test]
    fn plan_creates_four_entries() {
        let dir = TempDir::new().unwrap();
        let task = setup(&dir);
        let entries = plan_for_task(dir.path(), &task, &Config::default(), dt(9, 0)).unwrap();

        assert_eq!(entries.len(), 4);
        assert!(entries
            .iter()
            .take(3)
            .all(|e| e.recipient_id == "kid-1" && !e.level.targets_parents()));
        let manager = &entries[3];
        assert_eq!(manager.level, ReminderLevel::ManagerAlert);
        assert_eq!(manager.recipient_id, "mom");
        assert_eq!(manager.fire_at, dt(12, 0));
    }

    #[test]
    fn manager_alert_fans_out_to_all_parents() {
        let dir = TempDir::new().unwrap();
        let task = setup(&dir);
        let config = Config::default();
        let family = Family::load(dir.path(), "smith").unwrap();
        crate::family::join(dir.path(), &family.invite_code, "dad", "Dad", &config).unwrap();
        crate::family::promote(dir.path(), "smith", "dad").unwrap();

        let entries = plan_for_task(dir.path(), &task, &config, dt(9, 0)).unwrap();
        let alerts: Vec<_> = entries
            .iter()
            .filter(|e| e.level == ReminderLevel::ManagerAlert)
            .collect();
        assert_eq!(alerts.len(), 2);
    }

    #[test]
    fn replanning_cancels_previous_set() {
        let dir = TempDir::new().unwrap();
        let task = setup(&dir);
        let config = Config::default();

        plan_for_task(dir.path(), &task, &config, dt(9, 0)).unwrap();
        plan_for_task(dir.path(), &task, &config, dt(9, 30)).unwrap();

        let scheduled = list(dir.path(), Some(EntryStatus::Scheduled), None).unwrap();
        let cancelled = list(dir.path(), Some(EntryStatus::Cancelled), None).unwrap();
        assert_eq!(scheduled.len(), 4);
        assert_eq!(cancelled.len(), 4);
    }

    #[test]
    fn tick_fires_due_entries_only() {
        let dir = TempDir::new().unwrap();
        let task = setup(&dir);
        let config = Config::default();
        plan_for_task(dir.path(), &task, &config, dt(9, 0)).unwrap();

        let sink = MemorySink::new();
        let report = tick(dir.path(), dt(11, 30), &sink).unwrap();
        assert_eq!(report.fired, 1);
        assert_eq!(sink.sent().len(), 1);
        assert_eq!(sink.sent()[0].level, ReminderLevel::Initial);

        // Nothing new is due yet; a second tick is a no-op.
        let report = tick(dir.path(), dt(11, 31), &sink).unwrap();
        assert_eq!(report.fired, 0);
        assert_eq!(sink.sent().len(), 1);
    }

    #[test]
    fn completion_suppresses_remaining_escalations() {
        // Due 12:00, offset 30. The 11:30 reminder fires;
        // the task is completed at 11:40; the 11:45, 11:55, and 12:00
        // alerts must be suppressed.
        let dir = TempDir::new().unwrap();
        let task = setup(&dir);
        let config = Config::default();
        plan_for_task(dir.path(), &task, &config, dt(9, 0)).unwrap();

        let sink = MemorySink::new();
        tick(dir.path(), dt(11, 30), &sink).unwrap();

        let mut tasks = task::load_tasks(dir.path(), "smith").unwrap();
        task::complete_task(&mut tasks, task.id, "kid-1", None).unwrap();
        task::save_tasks(dir.path(), "smith", &tasks).unwrap();

        let report = tick(dir.path(), dt(12, 1), &sink).unwrap();
        assert_eq!(report.fired, 0);
        assert_eq!(report.suppressed, 3);
        assert_eq!(sink.sent().len(), 1);
    }

    #[test]
    fn cancel_for_task_marks_scheduled_entries() {
        let dir = TempDir::new().unwrap();
        let task = setup(&dir);
        plan_for_task(dir.path(), &task, &Config::default(), dt(9, 0)).unwrap();

        let cancelled = cancel_for_task(dir.path(), task.id).unwrap();
        assert_eq!(cancelled, 4);

        let sink = MemorySink::new();
        let report = tick(dir.path(), dt(13, 0), &sink).unwrap();
        assert_eq!(report.fired, 0);
        assert!(sink.sent().is_empty());
    }

    #[test]
    fn cancel_for_recipient_scopes_to_family_and_user() {
        let dir = TempDir::new().unwrap();
        let task = setup(&dir);
        plan_for_task(dir.path(), &task, &Config::default(), dt(9, 0)).unwrap();

        // Mom's manager alert survives; kid-1's three reminders go.
        let cancelled = cancel_for_recipient(dir.path(), "smith", "kid-1").unwrap();
        assert_eq!(cancelled, 3);
        let scheduled = list(dir.path(), Some(EntryStatus::Scheduled), None).unwrap();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].recipient_id, "mom");
    }

    #[test]
    fn delivery_failure_is_logged_and_entry_still_fires() {
        let dir = TempDir::new().unwrap();
        let task = setup(&dir);
        plan_for_task(dir.path(), &task, &Config::default(), dt(9, 0)).unwrap();

        let report = tick(dir.path(), dt(11, 30), &FailingSink).unwrap();
        assert_eq!(report.fired, 1);
        assert_eq!(report.failed, 1);

        // The entry is not retried on the next tick.
        let report = tick(dir.path(), dt(11, 31), &FailingSink).unwrap();
        assert_eq!(report.fired, 0);
    }

    #[test]
    fn deleted_task_suppresses_at_fire_time() {
        let dir = TempDir::new().unwrap();
        let task = setup(&dir);
        plan_for_task(dir.path(), &task, &Config::default(), dt(9, 0)).unwrap();

        let mut tasks = task::load_tasks(dir.path(), "smith").unwrap();
        task::remove_task(&mut tasks, task.id).unwrap();
        task::save_tasks(dir.path(), "smith", &tasks).unwrap();

        let sink = MemorySink::new();
        let report = tick(dir.path(), dt(13, 0), &sink).unwrap();
        assert_eq!(report.suppressed, 4);
        assert!(sink.sent().is_empty());
    }

    #[test]
    fn get_missing_entry_errors() {
        let dir = TempDir::new().unwrap();
        let err = get(dir.path(), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, TypebError::EntryNotFound(_)));
    }
}
