use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;
use typeb_core::config::{Config, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,
    /// Check the configuration for problems
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    match subcmd {
        ConfigSubcommand::Show => {
            if json {
                print_json(&config)?;
                return Ok(());
            }
            println!(
                "default_reminder_offset_minutes: {}",
                config.default_reminder_offset_minutes
            );
            println!(
                "quiet_hours: {} - {}",
                config.quiet_hours_start.format("%H:%M"),
                config.quiet_hours_end.format("%H:%M")
            );
            println!(
                "urgent_overrides_quiet_hours: {}",
                config.urgent_overrides_quiet_hours
            );
            println!("free_member_limit: {}", config.free_member_limit);
            println!("premium_member_limit: {}", config.premium_member_limit);
            println!(
                "webhook_secret: {}",
                if config.webhook_secret().is_some() {
                    "configured"
                } else {
                    "not configured"
                }
            );
            Ok(())
        }
        ConfigSubcommand::Validate => {
            let warnings = config.validate();
            if json {
                print_json(&warnings)?;
            } else if warnings.is_empty() {
                println!("Configuration OK.");
            } else {
                let rows: Vec<Vec<String>> = warnings
                    .iter()
                    .map(|w| {
                        let level = match w.level {
                            WarnLevel::Warning => "warning",
                            WarnLevel::Error => "error",
                        };
                        vec![level.to_string(), w.message.clone()]
                    })
                    .collect();
                print_table(&["LEVEL", "MESSAGE"], rows);
            }
            if warnings.iter().any(|w| w.level == WarnLevel::Error) {
                anyhow::bail!("configuration has errors");
            }
            Ok(())
        }
    }
}
