use crate::error::{Result, TypebError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TYPEB_DIR: &str = ".typeb";
pub const FAMILIES_DIR: &str = ".typeb/families";
pub const PREFS_DIR: &str = ".typeb/prefs";

pub const CONFIG_FILE: &str = ".typeb/config.yaml";
pub const SCHEDULE_FILE: &str = ".typeb/schedule.yaml";
pub const ENTITLEMENTS_FILE: &str = ".typeb/entitlements.yaml";

pub const MANIFEST_FILE: &str = "manifest.yaml";
pub const TASKS_FILE: &str = "tasks.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn typeb_dir(root: &Path) -> PathBuf {
    root.join(TYPEB_DIR)
}

pub fn family_dir(root: &Path, family_id: &str) -> PathBuf {
    root.join(FAMILIES_DIR).join(family_id)
}

pub fn family_manifest(root: &Path, family_id: &str) -> PathBuf {
    family_dir(root, family_id).join(MANIFEST_FILE)
}

pub fn family_tasks(root: &Path, family_id: &str) -> PathBuf {
    family_dir(root, family_id).join(TASKS_FILE)
}

pub fn prefs_path(root: &Path, user_id: &str) -> PathBuf {
    root.join(PREFS_DIR).join(format!("{user_id}.yaml"))
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn schedule_path(root: &Path) -> PathBuf {
    root.join(SCHEDULE_FILE)
}

pub fn entitlements_path(root: &Path) -> PathBuf {
    root.join(ENTITLEMENTS_FILE)
}

/// Error unless `typeb init` has been run under `root`.
pub fn ensure_initialized(root: &Path) -> Result<()> {
    if typeb_dir(root).is_dir() {
        Ok(())
    } else {
        Err(TypebError::NotInitialized)
    }
}

// ---------------------------------------------------------------------------
// Id validation (family ids and user ids share the same shape)
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !id_re().is_match(id) {
        return Err(TypebError::InvalidId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
