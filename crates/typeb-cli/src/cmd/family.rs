use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use typeb_core::config::Config;
use typeb_core::family::{self, Family};

#[derive(Subcommand)]
pub enum FamilySubcommand {
    /// Create a family; the creator becomes its first parent
    Create {
        id: String,
        #[arg(required = true)]
        name: Vec<String>,
        /// User id of the creator
        #[arg(long)]
        creator: String,
        /// Display name of the creator (defaults to the user id)
        #[arg(long)]
        creator_name: Option<String>,
    },
    /// Join a family via invite code (new members come in as children)
    Join {
        invite_code: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        user_name: Option<String>,
    },
    /// Show a single family
    Show { id: String },
    /// List all families
    List,
    /// Promote a member to parent
    Promote { id: String, user: String },
    /// Demote a parent to child (the last parent cannot be demoted)
    Demote { id: String, user: String },
    /// Remove a member; their pending reminders are cancelled
    Remove { id: String, user: String },
    /// Rotate the invite code
    Invite { id: String },
}

pub fn run(root: &Path, subcmd: FamilySubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        FamilySubcommand::Create {
            id,
            name,
            creator,
            creator_name,
        } => {
            let display = creator_name.unwrap_or_else(|| creator.clone());
            let family = family::create(root, &id, name.join(" "), &creator, display)
                .context("failed to create family")?;
            if json {
                print_json(&family)?;
            } else {
                println!(
                    "Created family '{}' (invite code: {})",
                    family.id, family.invite_code
                );
            }
            Ok(())
        }
        FamilySubcommand::Join {
            invite_code,
            user,
            user_name,
        } => {
            let config = Config::load(root)?;
            let display = user_name.unwrap_or_else(|| user.clone());
            let family = family::join(root, &invite_code, &user, display, &config)
                .with_context(|| format!("could not join with code '{invite_code}'"))?;
            if json {
                print_json(&family)?;
            } else {
                println!("{} joined family '{}'", user, family.id);
            }
            Ok(())
        }
        FamilySubcommand::Show { id } => {
            let family = Family::load(root, &id)?;
            show(&family, json)
        }
        FamilySubcommand::List => {
            let families = Family::list(root)?;
            if json {
                print_json(&families)?;
                return Ok(());
            }
            if families.is_empty() {
                println!("No families.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = families
                .iter()
                .map(|f| {
                    vec![
                        f.id.clone(),
                        f.name.clone(),
                        f.members.len().to_string(),
                        f.invite_code.clone(),
                    ]
                })
                .collect();
            print_table(&["ID", "NAME", "MEMBERS", "INVITE"], rows);
            Ok(())
        }
        FamilySubcommand::Promote { id, user } => {
            let family = family::promote(root, &id, &user)?;
            confirm(&family, &format!("Promoted {user} to parent"), json)
        }
        FamilySubcommand::Demote { id, user } => {
            let family = family::demote(root, &id, &user)?;
            confirm(&family, &format!("Demoted {user} to child"), json)
        }
        FamilySubcommand::Remove { id, user } => {
            let family = family::remove_member(root, &id, &user)?;
            confirm(&family, &format!("Removed {user}"), json)
        }
        FamilySubcommand::Invite { id } => {
            let family = family::regenerate_invite(root, &id)?;
            if json {
                print_json(&serde_json::json!({
                    "id": family.id,
                    "invite_code": family.invite_code,
                }))?;
            } else {
                println!("New invite code: {}", family.invite_code);
            }
            Ok(())
        }
    }
}

fn show(family: &Family, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(family)?;
        return Ok(());
    }
    println!("Family: {} ({})", family.name, family.id);
    println!("Invite: {}", family.invite_code);
    let rows: Vec<Vec<String>> = family
        .members
        .iter()
        .map(|m| {
            vec![
                m.id.clone(),
                m.name.clone(),
                m.role.to_string(),
                m.joined_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "ROLE", "JOINED"], rows);
    Ok(())
}

fn confirm(family: &Family, message: &str, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(family)?;
    } else {
        println!("{message}");
    }
    Ok(())
}
