use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use std::path::Path;
use std::str::FromStr;
use typeb_core::config::Config;
use typeb_core::task::{self, NewTask, Task};
use typeb_core::types::{Priority, TaskCategory};
use typeb_core::escalation;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Add a task and plan its reminder escalations
    Add {
        family: String,
        #[arg(required = true)]
        title: Vec<String>,
        #[arg(long)]
        assignee: String,
        /// User id of the creator
        #[arg(long)]
        by: String,
        /// Due timestamp, RFC 3339 (e.g. 2026-09-01T17:00:00Z)
        #[arg(long)]
        due: Option<String>,
        #[arg(long, default_value = "chores")]
        category: String,
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Minutes before the due date for the first reminder
        #[arg(long)]
        offset: Option<u32>,
        /// Require a photo to mark the task complete
        #[arg(long)]
        photo: bool,
        #[arg(long)]
        description: Option<String>,
    },
    /// List tasks in a family
    List {
        family: String,
        /// Only show pending tasks
        #[arg(long)]
        pending: bool,
        /// Only show tasks assigned to this user
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Edit a pending task; its reminders are re-planned
    Edit {
        family: String,
        task: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        /// New due timestamp, RFC 3339
        #[arg(long, conflicts_with = "no_due")]
        due: Option<String>,
        /// Remove the due date (stops the reminder ladder)
        #[arg(long)]
        no_due: bool,
        #[arg(long, conflicts_with = "no_offset")]
        offset: Option<u32>,
        /// Drop the per-task offset override
        #[arg(long)]
        no_offset: bool,
        /// Require a photo to mark the task complete
        #[arg(long, conflicts_with = "no_photo")]
        photo: bool,
        /// Drop the photo requirement
        #[arg(long)]
        no_photo: bool,
    },
    /// Show a single task
    Show { family: String, task: Uuid },
    /// Complete a task; its remaining reminders are cancelled
    Complete {
        family: String,
        task: Uuid,
        #[arg(long)]
        user: String,
        /// Photo reference, required for photo-validated tasks
        #[arg(long)]
        photo_ref: Option<String>,
    },
    /// Reopen a completed task and re-plan its reminders
    Reopen { family: String, task: Uuid },
    /// Delete a task and cancel its reminders
    Delete { family: String, task: Uuid },
}

pub fn run(root: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::Add {
            family,
            title,
            assignee,
            by,
            due,
            category,
            priority,
            offset,
            photo,
            description,
        } => {
            let due_at = due.map(|d| parse_timestamp(&d)).transpose()?;
            let category = TaskCategory::from_str(&category)?;
            let priority = Priority::from_str(&priority)?;

            let mut tasks = task::load_tasks(root, &family)?;
            let id = task::add_task(
                &mut tasks,
                &family,
                NewTask {
                    title: title.join(" "),
                    description,
                    category,
                    priority,
                    assignee_id: assignee,
                    due_at,
                    reminder_offset_minutes: offset,
                    photo_required: photo,
                    created_by: by,
                },
            )?;
            task::save_tasks(root, &family, &tasks)?;

            let config = Config::load(root)?;
            let added = task::find(&tasks, id)?;
            let planned = escalation::plan_for_task(root, added, &config, Utc::now())?;

            if json {
                print_json(&serde_json::json!({
                    "task": added,
                    "reminders_planned": planned.len(),
                }))?;
            } else {
                println!("Added task {id} ({} reminders planned)", planned.len());
            }
            Ok(())
        }
        TaskSubcommand::List {
            family,
            pending,
            assignee,
        } => {
            let mut tasks = task::load_tasks(root, &family)?;
            if pending {
                tasks.retain(|t| !t.is_completed());
            }
            if let Some(user) = assignee {
                tasks.retain(|t| t.assignee_id == user);
            }
            if json {
                print_json(&tasks)?;
                return Ok(());
            }
            if tasks.is_empty() {
                println!("No tasks.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = tasks
                .iter()
                .map(|t| {
                    vec![
                        t.id.to_string(),
                        t.title.clone(),
                        t.assignee_id.clone(),
                        t.priority.to_string(),
                        t.due_at
                            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        t.status.to_string(),
                    ]
                })
                .collect();
            print_table(
                &["ID", "TITLE", "ASSIGNEE", "PRIORITY", "DUE", "STATUS"],
                rows,
            );
            println!("\n{}", task::summarize(&tasks));
            Ok(())
        }
        TaskSubcommand::Edit {
            family,
            task: id,
            title,
            description,
            category,
            priority,
            assignee,
            due,
            no_due,
            offset,
            no_offset,
            photo,
            no_photo,
        } => {
            let patch = task::TaskPatch {
                title,
                description,
                category: category.as_deref().map(TaskCategory::from_str).transpose()?,
                priority: priority.as_deref().map(Priority::from_str).transpose()?,
                assignee_id: assignee,
                due_at: due.map(|d| parse_timestamp(&d)).transpose()?,
                clear_due_at: no_due,
                reminder_offset_minutes: offset,
                clear_reminder_offset: no_offset,
                photo_required: if photo {
                    Some(true)
                } else if no_photo {
                    Some(false)
                } else {
                    None
                },
            };

            let mut tasks = task::load_tasks(root, &family)?;
            let edited = task::edit_task(&mut tasks, id, patch)?.clone();
            task::save_tasks(root, &family, &tasks)?;
            let config = Config::load(root)?;
            let planned = escalation::plan_for_task(root, &edited, &config, Utc::now())?;
            if json {
                print_json(&serde_json::json!({
                    "task": edited,
                    "reminders_planned": planned.len(),
                }))?;
            } else {
                println!(
                    "Updated '{}' ({} reminders planned)",
                    edited.title,
                    planned.len()
                );
            }
            Ok(())
        }
        TaskSubcommand::Show { family, task: id } => {
            let tasks = task::load_tasks(root, &family)?;
            let found = task::find(&tasks, id)?;
            if json {
                print_json(found)?;
            } else {
                print_task(found);
            }
            Ok(())
        }
        TaskSubcommand::Complete {
            family,
            task: id,
            user,
            photo_ref,
        } => {
            let mut tasks = task::load_tasks(root, &family)?;
            let completed = task::complete_task(&mut tasks, id, &user, photo_ref)?.clone();
            task::save_tasks(root, &family, &tasks)?;
            let cancelled = escalation::cancel_for_task(root, id)?;
            if json {
                print_json(&serde_json::json!({
                    "task": completed,
                    "reminders_cancelled": cancelled,
                }))?;
            } else {
                println!(
                    "Completed '{}' ({cancelled} reminders cancelled)",
                    completed.title
                );
            }
            Ok(())
        }
        TaskSubcommand::Reopen { family, task: id } => {
            let mut tasks = task::load_tasks(root, &family)?;
            let reopened = task::reopen_task(&mut tasks, id)?.clone();
            task::save_tasks(root, &family, &tasks)?;
            let config = Config::load(root)?;
            let planned = escalation::plan_for_task(root, &reopened, &config, Utc::now())?;
            if json {
                print_json(&serde_json::json!({
                    "task": reopened,
                    "reminders_planned": planned.len(),
                }))?;
            } else {
                println!(
                    "Reopened '{}' ({} reminders planned)",
                    reopened.title,
                    planned.len()
                );
            }
            Ok(())
        }
        TaskSubcommand::Delete { family, task: id } => {
            let mut tasks = task::load_tasks(root, &family)?;
            let removed = task::remove_task(&mut tasks, id)?;
            task::save_tasks(root, &family, &tasks)?;
            let cancelled = escalation::cancel_for_task(root, id)?;
            if json {
                print_json(&serde_json::json!({
                    "deleted": removed.id,
                    "reminders_cancelled": cancelled,
                }))?;
            } else {
                println!("Deleted '{}' ({cancelled} reminders cancelled)", removed.title);
            }
            Ok(())
        }
    }
}

fn parse_timestamp(value: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .with_context(|| format!("invalid timestamp '{value}', expected RFC 3339"))
}

fn print_task(task: &Task) {
    println!("Task: {}", task.title);
    println!("  id:        {}", task.id);
    println!("  assignee:  {}", task.assignee_id);
    println!("  category:  {}", task.category);
    println!("  priority:  {}", task.priority);
    println!("  status:    {}", task.status);
    if let Some(due) = task.due_at {
        println!("  due:       {}", due.to_rfc3339());
    }
    if let Some(offset) = task.reminder_offset_minutes {
        println!("  offset:    {offset}m before due");
    }
    if task.photo_required {
        println!("  photo:     required");
    }
    if let Some(desc) = &task.description {
        println!("  notes:     {desc}");
    }
    if let Some(at) = task.completed_at {
        let by = task.completed_by.as_deref().unwrap_or("?");
        println!("  completed: {} by {by}", at.to_rfc3339());
    }
}
