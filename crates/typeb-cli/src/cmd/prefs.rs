use crate::output::print_json;
use anyhow::Context;
use chrono::NaiveTime;
use clap::Subcommand;
use std::path::Path;
use typeb_core::config::Config;
use typeb_core::prefs::{QuietHours, UserPrefs};

#[derive(Subcommand)]
pub enum PrefsSubcommand {
    /// Show a user's notification preferences
    Show { user: String },
    /// Update a user's notification preferences
    Set {
        user: String,
        /// Default minutes before the due date for the first reminder
        #[arg(long)]
        offset: Option<u32>,
        /// Quiet hours start, 24h clock (e.g. 21:00)
        #[arg(long)]
        quiet_start: Option<String>,
        /// Quiet hours end, 24h clock (e.g. 07:00)
        #[arg(long)]
        quiet_end: Option<String>,
        /// Clear the quiet hours window entirely
        #[arg(long, conflicts_with_all = ["quiet_start", "quiet_end"])]
        no_quiet: bool,
        /// Turn reminders on for this user
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        /// Turn reminders off for this user
        #[arg(long)]
        disable: bool,
    },
}

pub fn run(root: &Path, subcmd: PrefsSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    match subcmd {
        PrefsSubcommand::Show { user } => {
            let prefs = UserPrefs::load_or_default(root, &user, &config)?;
            show(&prefs, json)
        }
        PrefsSubcommand::Set {
            user,
            offset,
            quiet_start,
            quiet_end,
            no_quiet,
            enable,
            disable,
        } => {
            let mut prefs = UserPrefs::load_or_default(root, &user, &config)?;
            if let Some(minutes) = offset {
                prefs.default_reminder_offset_minutes = minutes;
            }
            if no_quiet {
                prefs.quiet_hours = None;
            } else if quiet_start.is_some() || quiet_end.is_some() {
                let current = prefs.quiet_hours.unwrap_or(QuietHours {
                    start: config.quiet_hours_start,
                    end: config.quiet_hours_end,
                });
                prefs.quiet_hours = Some(QuietHours {
                    start: match quiet_start {
                        Some(s) => parse_clock(&s)?,
                        None => current.start,
                    },
                    end: match quiet_end {
                        Some(s) => parse_clock(&s)?,
                        None => current.end,
                    },
                });
            }
            if enable {
                prefs.reminders_enabled = true;
            } else if disable {
                prefs.reminders_enabled = false;
            }
            prefs.save(root)?;
            show(&prefs, json)
        }
    }
}

fn parse_clock(value: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .with_context(|| format!("invalid time '{value}', expected HH:MM"))
}

fn show(prefs: &UserPrefs, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(prefs)?;
        return Ok(());
    }
    println!("Preferences for {}", prefs.user_id);
    println!(
        "  default offset: {}m before due",
        prefs.default_reminder_offset_minutes
    );
    match &prefs.quiet_hours {
        Some(q) => println!(
            "  quiet hours:    {} - {}",
            q.start.format("%H:%M"),
            q.end.format("%H:%M")
        ),
        None => println!("  quiet hours:    none"),
    }
    println!(
        "  reminders:      {}",
        if prefs.reminders_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    Ok(())
}
