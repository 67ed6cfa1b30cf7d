use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use std::path::Path;
use std::time::Duration;
use typeb_core::dispatch::LogSink;
use typeb_core::escalation::{self, EntryStatus};

#[derive(Subcommand)]
pub enum RemindSubcommand {
    /// Fire every entry due as of now (or --at) through the log sink
    Tick {
        /// Evaluate the ledger as of this RFC 3339 timestamp instead of now
        #[arg(long)]
        at: Option<String>,
        /// Show what would fire without delivering or updating the ledger
        #[arg(long)]
        dry_run: bool,
    },
    /// Tick on a fixed interval until interrupted
    Run {
        /// Seconds between ticks
        #[arg(long, default_value = "30")]
        interval: u64,
    },
}

pub fn run(root: &Path, subcmd: RemindSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        RemindSubcommand::Tick { at, dry_run } => {
            let now = match at {
                Some(value) => DateTime::parse_from_rfc3339(&value)
                    .map(|d| d.with_timezone(&Utc))
                    .with_context(|| format!("invalid timestamp '{value}', expected RFC 3339"))?,
                None => Utc::now(),
            };

            if dry_run {
                let due: Vec<_> = escalation::list(root, Some(EntryStatus::Scheduled), None)?
                    .into_iter()
                    .filter(|e| e.fire_at <= now)
                    .collect();
                if json {
                    print_json(&due)?;
                } else if due.is_empty() {
                    println!("Nothing due.");
                } else {
                    let rows: Vec<Vec<String>> = due
                        .iter()
                        .map(|e| {
                            vec![
                                e.recipient_id.clone(),
                                e.level.to_string(),
                                e.fire_at.to_rfc3339(),
                            ]
                        })
                        .collect();
                    print_table(&["RECIPIENT", "LEVEL", "FIRE AT"], rows);
                }
                return Ok(());
            }

            let report = escalation::tick(root, now, &LogSink)?;
            if json {
                print_json(&report)?;
            } else {
                println!(
                    "Fired {} reminders ({} suppressed, {} delivery failures)",
                    report.fired, report.suppressed, report.failed
                );
            }
            Ok(())
        }
        RemindSubcommand::Run { interval } => {
            let sink = LogSink;
            tracing::info!("reminder loop started (every {interval}s)");
            loop {
                let report = escalation::tick(root, Utc::now(), &sink)?;
                if report.fired > 0 || report.suppressed > 0 {
                    tracing::info!(
                        fired = report.fired,
                        suppressed = report.suppressed,
                        failed = report.failed,
                        "tick complete"
                    );
                }
                std::thread::sleep(Duration::from_secs(interval));
            }
        }
    }
}
