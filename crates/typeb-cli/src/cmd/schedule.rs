use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use std::path::Path;
use std::str::FromStr;
use typeb_core::config::Config;
use typeb_core::escalation::{self, EntryStatus};
use typeb_core::prefs::UserPrefs;
use typeb_core::schedule::compute_schedule;
use typeb_core::task;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum ScheduleSubcommand {
    /// Preview the ladder for a task without touching the ledger
    Preview { family: String, task: Uuid },
    /// Re-plan a task's reminders, replacing its scheduled entries
    Plan { family: String, task: Uuid },
    /// List ledger entries
    List {
        /// Filter by status (scheduled, fired, suppressed, cancelled)
        #[arg(long)]
        status: Option<String>,
        /// Filter by task id
        #[arg(long)]
        task: Option<Uuid>,
    },
}

pub fn run(root: &Path, subcmd: ScheduleSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ScheduleSubcommand::Preview { family, task: id } => {
            let tasks = task::load_tasks(root, &family)?;
            let found = task::find(&tasks, id)?;
            let config = Config::load(root)?;
            let prefs = UserPrefs::load_or_default(root, &found.assignee_id, &config)?;
            let planned = compute_schedule(found, &prefs, &config, Utc::now());
            if json {
                let items: Vec<serde_json::Value> = planned
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "level": p.level.as_str(),
                            "fire_at": p.fire_at.to_rfc3339(),
                        })
                    })
                    .collect();
                print_json(&items)?;
                return Ok(());
            }
            if planned.is_empty() {
                println!("Nothing to schedule.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = planned
                .iter()
                .map(|p| vec![p.level.to_string(), p.fire_at.to_rfc3339()])
                .collect();
            print_table(&["LEVEL", "FIRE AT"], rows);
            Ok(())
        }
        ScheduleSubcommand::Plan { family, task: id } => {
            let tasks = task::load_tasks(root, &family)?;
            let found = task::find(&tasks, id)?;
            let config = Config::load(root)?;
            let inserted = escalation::plan_for_task(root, found, &config, Utc::now())?;
            if json {
                print_json(&inserted)?;
            } else {
                println!("Planned {} reminders for '{}'", inserted.len(), found.title);
            }
            Ok(())
        }
        ScheduleSubcommand::List { status, task } => {
            let status = status
                .map(|s| {
                    EntryStatus::from_str(&s)
                        .with_context(|| format!("unknown entry status '{s}'"))
                })
                .transpose()?;
            let entries = escalation::list(root, status, task)?;
            if json {
                print_json(&entries)?;
                return Ok(());
            }
            if entries.is_empty() {
                println!("No reminder entries.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| {
                    vec![
                        e.id.to_string(),
                        e.task_id.to_string(),
                        e.recipient_id.clone(),
                        e.level.to_string(),
                        e.fire_at.format("%Y-%m-%d %H:%M").to_string(),
                        e.status.to_string(),
                    ]
                })
                .collect();
            print_table(
                &["ID", "TASK", "RECIPIENT", "LEVEL", "FIRE AT", "STATUS"],
                rows,
            );
            Ok(())
        }
    }
}
