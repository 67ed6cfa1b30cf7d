//! Reminder scheduler: pure timestamp computation, no I/O.
//!
//! The escalation ladder has a fixed depth: three pre-due reminders for the
//! assignee, then a manager alert to the parents at the due time.
//!
//! Quiet-hours policy:
//!   - a rung inside the assignee's quiet window is deferred to the end of
//!     the window, never skipped silently;
//!   - urgent-priority tasks bypass quiet hours entirely (configurable);
//!   - a deferred pre-due rung that lands at or after the due time is
//!     dropped (the manager alert covers the miss);
//!   - the manager alert is deferred like any other rung but never dropped.

use crate::config::Config;
use crate::prefs::{QuietHours, UserPrefs};
use crate::task::Task;
use crate::types::{Priority, ReminderLevel};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Minutes before the due time for the fixed middle rungs of the ladder.
const FOLLOW_UP_MINUTES: i64 = 15;
const FINAL_CALL_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedReminder {
    pub level: ReminderLevel,
    pub fire_at: DateTime<Utc>,
}

/// Compute the reminder schedule for a task as of `now`.
///
/// Returns an empty schedule for completed tasks, tasks without a due date,
/// and assignees who have turned reminders off. Rungs already in the past at
/// planning time are dropped. The result is strictly increasing in time.
pub fn compute_schedule(
    task: &Task,
    prefs: &UserPrefs,
    config: &Config,
    now: DateTime<Utc>,
) -> Vec<PlannedReminder> {
    if task.is_completed() || !prefs.reminders_enabled {
        return Vec::new();
    }
    let Some(due) = task.due_at else {
        return Vec::new();
    };

    let offset = task
        .reminder_offset_minutes
        .unwrap_or(prefs.default_reminder_offset_minutes) as i64;

    let candidates = [
        (ReminderLevel::Initial, due - Duration::minutes(offset)),
        (
            ReminderLevel::FollowUp,
            due - Duration::minutes(FOLLOW_UP_MINUTES),
        ),
        (
            ReminderLevel::FinalCall,
            due - Duration::minutes(FINAL_CALL_MINUTES),
        ),
        (ReminderLevel::ManagerAlert, due),
    ];

    let bypass_quiet =
        task.priority == Priority::Urgent && config.urgent_overrides_quiet_hours;
    let quiet = if bypass_quiet {
        None
    } else {
        prefs.quiet_hours
    };

    // Walk the ladder from the manager alert backwards, keeping only rungs
    // strictly earlier than the next kept rung. Deferral can collapse rungs
    // onto each other; the more urgent rung wins.
    let mut kept: Vec<PlannedReminder> = Vec::with_capacity(candidates.len());
    let mut bound: Option<DateTime<Utc>> = None;
    for (level, fire_at) in candidates.iter().rev() {
        let fire_at = match quiet {
            Some(qh) => defer_out_of_quiet(*fire_at, &qh),
            None => *fire_at,
        };
        if *level != ReminderLevel::ManagerAlert {
            if fire_at >= due {
                continue;
            }
            if bound.is_some_and(|b| fire_at >= b) {
                continue;
            }
        }
        bound = Some(fire_at);
        kept.push(PlannedReminder {
            level: *level,
            fire_at,
        });
    }

    kept.reverse();
    kept.retain(|r| r.fire_at > now);
    kept
}

/// Push a fire time out of a quiet window: the next occurrence of the
/// window's end time strictly after `fire_at`. Handles windows that span
/// midnight.
fn defer_out_of_quiet(fire_at: DateTime<Utc>, quiet: &QuietHours) -> DateTime<Utc> {
    if !quiet.contains(fire_at.time()) {
        return fire_at;
    }
    let same_day = Utc.from_utc_datetime(&fire_at.date_naive().and_time(quiet.end));
    if same_day > fire_at {
        same_day
    } else {
        same_day + Duration::days(1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, Task};
    use crate::types::{TaskCategory, TaskStatus};
    use chrono::NaiveTime;

    fn dt(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, h, m, 0).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn make_task(due: Option<DateTime<Utc>>, priority: Priority) -> Task {
        let mut tasks = Vec::new();
        crate::task::add_task(
            &mut tasks,
            "smith",
            NewTask {
                title: "Homework".to_string(),
                description: None,
                category: TaskCategory::Homework,
                priority,
                assignee_id: "kid-1".to_string(),
                due_at: due,
                reminder_offset_minutes: None,
                photo_required: false,
                created_by: "mom".to_string(),
            },
        )
        .unwrap();
        tasks.pop().unwrap()
    }

    fn no_quiet_prefs() -> UserPrefs {
        UserPrefs {
            user_id: "kid-1".to_string(),
            default_reminder_offset_minutes: 30,
            quiet_hours: None,
            reminders_enabled: true,
        }
    }

    fn quiet_prefs(start: NaiveTime, end: NaiveTime) -> UserPrefs {
        UserPrefs {
            quiet_hours: Some(QuietHours { start, end }),
            ..no_quiet_prefs()
        }
    }

    #[test]
    fn canonical_ladder() {
        // Due at T with a 30-minute offset produces T-30, T-15, T-5,
        // and a manager alert at T.
        let due = dt(10, 12, 0);
        let task = make_task(Some(due), Priority::Medium);
        let schedule =
            compute_schedule(&task, &no_quiet_prefs(), &Config::default(), dt(10, 9, 0));

        let expect = [
            (ReminderLevel::Initial, dt(10, 11, 30)),
            (ReminderLevel::FollowUp, dt(10, 11, 45)),
            (ReminderLevel::FinalCall, dt(10, 11, 55)),
            (ReminderLevel::ManagerAlert, dt(10, 12, 0)),
        ];
        assert_eq!(schedule.len(), 4);
        for (planned, (level, fire_at)) in schedule.iter().zip(expect) {
            assert_eq!(planned.level, level);
            assert_eq!(planned.fire_at, fire_at);
        }
    }

    #[test]
    fn task_offset_overrides_prefs() {
        let due = dt(10, 12, 0);
        let mut task = make_task(Some(due), Priority::Medium);
        task.reminder_offset_minutes = Some(60);
        let schedule =
            compute_schedule(&task, &no_quiet_prefs(), &Config::default(), dt(10, 9, 0));
        assert_eq!(schedule[0].fire_at, dt(10, 11, 0));
    }

    #[test]
    fn short_offset_collapses_initial_rung() {
        let due = dt(10, 12, 0);
        let mut task = make_task(Some(due), Priority::Medium);
        task.reminder_offset_minutes = Some(15);
        let schedule =
            compute_schedule(&task, &no_quiet_prefs(), &Config::default(), dt(10, 9, 0));

        let levels: Vec<_> = schedule.iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![
                ReminderLevel::FollowUp,
                ReminderLevel::FinalCall,
                ReminderLevel::ManagerAlert,
            ]
        );
    }

    #[test]
    fn strictly_increasing() {
        let due = dt(10, 12, 0);
        let mut task = make_task(Some(due), Priority::Medium);
        task.reminder_offset_minutes = Some(10);
        let schedule =
            compute_schedule(&task, &no_quiet_prefs(), &Config::default(), dt(10, 9, 0));
        for pair in schedule.windows(2) {
            assert!(pair[0].fire_at < pair[1].fire_at);
        }
    }

    #[test]
    fn past_rungs_dropped_at_planning() {
        let due = dt(10, 12, 0);
        let task = make_task(Some(due), Priority::Medium);
        // Planning at T-10: only the final call and the manager alert remain.
        let schedule =
            compute_schedule(&task, &no_quiet_prefs(), &Config::default(), dt(10, 11, 50));
        let levels: Vec<_> = schedule.iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![ReminderLevel::FinalCall, ReminderLevel::ManagerAlert]
        );
    }

    #[test]
    fn no_due_date_means_no_schedule() {
        let task = make_task(None, Priority::Medium);
        let schedule =
            compute_schedule(&task, &no_quiet_prefs(), &Config::default(), dt(10, 9, 0));
        assert!(schedule.is_empty());
    }

    #[test]
    fn completed_task_has_no_schedule() {
        let mut task = make_task(Some(dt(10, 12, 0)), Priority::Medium);
        task.status = TaskStatus::Completed;
        let schedule =
            compute_schedule(&task, &no_quiet_prefs(), &Config::default(), dt(10, 9, 0));
        assert!(schedule.is_empty());
    }

    #[test]
    fn reminders_disabled_means_no_schedule() {
        let task = make_task(Some(dt(10, 12, 0)), Priority::Medium);
        let mut prefs = no_quiet_prefs();
        prefs.reminders_enabled = false;
        let schedule = compute_schedule(&task, &prefs, &Config::default(), dt(10, 9, 0));
        assert!(schedule.is_empty());
    }

    #[test]
    fn quiet_hours_defer_manager_alert_and_drop_pre_due() {
        // Due at 22:00, quiet 21:00-07:00: every pre-due rung defers past
        // the due time and is dropped; the manager alert fires at 07:00
        // the next morning.
        let due = dt(10, 22, 0);
        let task = make_task(Some(due), Priority::Medium);
        let prefs = quiet_prefs(t(21, 0), t(7, 0));
        let schedule = compute_schedule(&task, &prefs, &Config::default(), dt(10, 9, 0));

        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].level, ReminderLevel::ManagerAlert);
        assert_eq!(schedule[0].fire_at, dt(11, 7, 0));
    }

    #[test]
    fn quiet_hours_defer_keeps_pre_due_rung_that_still_fits() {
        // Quiet 03:00-03:40, due 04:00: the initial rung at 03:30 defers to
        // 03:40, still before the follow-up at 03:45.
        let due = dt(10, 4, 0);
        let task = make_task(Some(due), Priority::Medium);
        let prefs = quiet_prefs(t(3, 0), t(3, 40));
        let schedule = compute_schedule(&task, &prefs, &Config::default(), dt(10, 1, 0));

        assert_eq!(schedule.len(), 4);
        assert_eq!(schedule[0].level, ReminderLevel::Initial);
        assert_eq!(schedule[0].fire_at, dt(10, 3, 40));
        assert_eq!(schedule[1].fire_at, dt(10, 3, 45));
    }

    #[test]
    fn urgent_bypasses_quiet_hours() {
        let due = dt(10, 22, 0);
        let task = make_task(Some(due), Priority::Urgent);
        let prefs = quiet_prefs(t(21, 0), t(7, 0));
        let schedule = compute_schedule(&task, &prefs, &Config::default(), dt(10, 9, 0));

        assert_eq!(schedule.len(), 4);
        assert_eq!(schedule[0].fire_at, dt(10, 21, 30));
        assert_eq!(schedule[3].fire_at, due);
    }

    #[test]
    fn urgent_override_can_be_disabled() {
        let due = dt(10, 22, 0);
        let task = make_task(Some(due), Priority::Urgent);
        let prefs = quiet_prefs(t(21, 0), t(7, 0));
        let mut config = Config::default();
        config.urgent_overrides_quiet_hours = false;
        let schedule = compute_schedule(&task, &prefs, &config, dt(10, 9, 0));

        // Urgent no longer bypasses: same deferral as a medium task.
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].level, ReminderLevel::ManagerAlert);
    }

    #[test]
    fn defer_crosses_midnight() {
        let fire = dt(10, 23, 30);
        let qh = QuietHours {
            start: t(21, 0),
            end: t(7, 0),
        };
        assert_eq!(defer_out_of_quiet(fire, &qh), dt(11, 7, 0));
    }

    #[test]
    fn defer_noop_outside_window() {
        let fire = dt(10, 12, 0);
        let qh = QuietHours {
            start: t(21, 0),
            end: t(7, 0),
        };
        assert_eq!(defer_out_of_quiet(fire, &qh), fire);
    }
}
