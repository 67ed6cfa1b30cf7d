//! Family accounts: the ownership boundary for tasks and reminders.
//!
//! Layout:
//!   .typeb/families/<id>/manifest.yaml
//!
//! Invariant: a family always has at least one Parent. Demotion and removal
//! of the last parent are rejected.

use crate::config::Config;
use crate::error::{Result, TypebError};
use crate::io;
use crate::paths;
use crate::types::Role;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    pub id: String,
    pub name: String,
    pub members: Vec<Member>,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
}

// Ambiguous glyphs (0/O, 1/I/L) are excluded from invite codes.
const INVITE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const INVITE_LEN: usize = 6;

fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_LEN)
        .map(|_| INVITE_ALPHABET[rng.gen_range(0..INVITE_ALPHABET.len())] as char)
        .collect()
}

// ---------------------------------------------------------------------------
// Load / save / list
// ---------------------------------------------------------------------------

impl Family {
    pub fn load(root: &Path, id: &str) -> Result<Self> {
        let manifest = paths::family_manifest(root, id);
        io::load_yaml(&manifest)?.ok_or_else(|| TypebError::FamilyNotFound(id.to_string()))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::save_yaml(&paths::family_manifest(root, &self.id), self)
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let families_dir = root.join(paths::FAMILIES_DIR);
        if !families_dir.exists() {
            return Ok(Vec::new());
        }

        let mut families = Vec::new();
        for entry in std::fs::read_dir(&families_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let id = entry.file_name().to_string_lossy().into_owned();
                match Self::load(root, &id) {
                    Ok(f) => families.push(f),
                    Err(TypebError::FamilyNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        families.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(families)
    }

    pub fn find_by_invite(root: &Path, code: &str) -> Result<Self> {
        Self::list(root)?
            .into_iter()
            .find(|f| f.invite_code.eq_ignore_ascii_case(code))
            .ok_or_else(|| TypebError::InvalidInviteCode(code.to_string()))
    }

    // ---------------------------------------------------------------------------
    // Membership helpers
    // ---------------------------------------------------------------------------

    pub fn member(&self, user_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == user_id)
    }

    pub fn parents(&self) -> Vec<&Member> {
        self.members
            .iter()
            .filter(|m| m.role == Role::Parent)
            .collect()
    }

    pub fn is_parent(&self, user_id: &str) -> bool {
        self.member(user_id).is_some_and(|m| m.role == Role::Parent)
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Create a family. The creator becomes its first (and so far only) Parent.
pub fn create(
    root: &Path,
    id: &str,
    name: impl Into<String>,
    creator_id: &str,
    creator_name: impl Into<String>,
) -> Result<Family> {
    paths::validate_id(id)?;
    paths::validate_id(creator_id)?;
    if paths::family_manifest(root, id).exists() {
        return Err(TypebError::FamilyExists(id.to_string()));
    }

    let family = Family {
        id: id.to_string(),
        name: name.into(),
        members: vec![Member {
            id: creator_id.to_string(),
            name: creator_name.into(),
            role: Role::Parent,
            joined_at: Utc::now(),
        }],
        invite_code: generate_invite_code(),
        created_at: Utc::now(),
    };
    family.save(root)?;
    Ok(family)
}

/// Join a family via invite code. New joiners come in as Child; a parent can
/// promote them afterwards. Rejected when the family is at its plan's member
/// limit or the user is already a member.
pub fn join(
    root: &Path,
    invite_code: &str,
    user_id: &str,
    user_name: impl Into<String>,
    config: &Config,
) -> Result<Family> {
    paths::validate_id(user_id)?;
    let mut family = Family::find_by_invite(root, invite_code)?;

    if family.member(user_id).is_some() {
        return Err(TypebError::AlreadyMember(user_id.to_string()));
    }

    let plan = crate::entitlement::effective_plan(root, &family)?;
    let limit = config.member_limit(plan);
    if family.members.len() as u32 >= limit {
        return Err(TypebError::FamilyFull { limit });
    }

    family.members.push(Member {
        id: user_id.to_string(),
        name: user_name.into(),
        role: Role::Child,
        joined_at: Utc::now(),
    });
    family.save(root)?;
    Ok(family)
}

pub fn promote(root: &Path, family_id: &str, user_id: &str) -> Result<Family> {
    let mut family = Family::load(root, family_id)?;
    let member = family
        .members
        .iter_mut()
        .find(|m| m.id == user_id)
        .ok_or_else(|| TypebError::MemberNotFound(user_id.to_string()))?;
    member.role = Role::Parent;
    family.save(root)?;
    Ok(family)
}

pub fn demote(root: &Path, family_id: &str, user_id: &str) -> Result<Family> {
    let mut family = Family::load(root, family_id)?;
    if family.is_parent(user_id) && family.parents().len() == 1 {
        return Err(TypebError::LastParent);
    }
    let member = family
        .members
        .iter_mut()
        .find(|m| m.id == user_id)
        .ok_or_else(|| TypebError::MemberNotFound(user_id.to_string()))?;
    member.role = Role::Child;
    family.save(root)?;
    Ok(family)
}

/// Remove a member. Their not-yet-fired reminders are cancelled so nothing
/// fires at a user who is no longer in the family.
pub fn remove_member(root: &Path, family_id: &str, user_id: &str) -> Result<Family> {
    let mut family = Family::load(root, family_id)?;
    if family.member(user_id).is_none() {
        return Err(TypebError::MemberNotFound(user_id.to_string()));
    }
    if family.is_parent(user_id) && family.parents().len() == 1 {
        return Err(TypebError::LastParent);
    }

    family.members.retain(|m| m.id != user_id);
    family.save(root)?;
    crate::escalation::cancel_for_recipient(root, family_id, user_id)?;
    Ok(family)
}

pub fn regenerate_invite(root: &Path, family_id: &str) -> Result<Family> {
    let mut family = Family::load(root, family_id)?;
    family.invite_code = generate_invite_code();
    family.save(root)?;
    Ok(family)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
