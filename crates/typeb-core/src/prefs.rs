//! Per-user notification preferences.
//!
//! Layout:
//!   .typeb/prefs/<user_id>.yaml
//!
//! Users without a prefs file get defaults derived from the project config,
//! so the scheduler never has to special-case a missing file.

use crate::config::Config;
use crate::error::Result;
use crate::io;
use crate::paths;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// QuietHours
// ---------------------------------------------------------------------------

/// A daily do-not-disturb window. The window may span midnight
/// (e.g. 21:00 → 07:00). A window with `start == end` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl QuietHours {
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.start == self.end {
            return false;
        }
        if self.start < self.end {
            t >= self.start && t < self.end
        } else {
            t >= self.start || t < self.end
        }
    }
}

// ---------------------------------------------------------------------------
// UserPrefs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPrefs {
    pub user_id: String,

    #[serde(default = "default_offset")]
    pub default_reminder_offset_minutes: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_hours: Option<QuietHours>,

    #[serde(default = "default_enabled")]
    pub reminders_enabled: bool,
}

fn default_offset() -> u32 {
    30
}

fn default_enabled() -> bool {
    true
}

impl UserPrefs {
    /// Defaults for a user with no prefs file, seeded from the config.
    pub fn defaults_for(user_id: impl Into<String>, config: &Config) -> Self {
        Self {
            user_id: user_id.into(),
            default_reminder_offset_minutes: config.default_reminder_offset_minutes,
            quiet_hours: Some(QuietHours {
                start: config.quiet_hours_start,
                end: config.quiet_hours_end,
            }),
            reminders_enabled: true,
        }
    }

    pub fn load_or_default(root: &Path, user_id: &str, config: &Config) -> Result<Self> {
        paths::validate_id(user_id)?;
        match io::load_yaml(&paths::prefs_path(root, user_id))? {
            Some(prefs) => Ok(prefs),
            None => Ok(Self::defaults_for(user_id, config)),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::save_yaml(&paths::prefs_path(root, &self.user_id), self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn quiet_window_same_day() {
        let qh = QuietHours {
            start: t(13, 0),
            end: t(14, 0),
        };
        assert!(qh.contains(t(13, 30)));
        assert!(qh.contains(t(13, 0)));
        assert!(!qh.contains(t(14, 0)));
        assert!(!qh.contains(t(12, 59)));
    }

    #[test]
    fn quiet_window_spans_midnight() {
        let qh = QuietHours {
            start: t(21, 0),
            end: t(7, 0),
        };
        assert!(qh.contains(t(22, 30)));
        assert!(qh.contains(t(2, 0)));
        assert!(qh.contains(t(21, 0)));
        assert!(!qh.contains(t(7, 0)));
        assert!(!qh.contains(t(12, 0)));
    }

    #[test]
    fn empty_window_contains_nothing() {
        let qh = QuietHours {
            start: t(9, 0),
            end: t(9, 0),
        };
        assert!(!qh.contains(t(9, 0)));
        assert!(!qh.contains(t(21, 0)));
    }

    #[test]
    fn load_missing_uses_config_defaults() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.default_reminder_offset_minutes = 45;

        let prefs = UserPrefs::load_or_default(dir.path(), "kid-1", &config).unwrap();
        assert_eq!(prefs.default_reminder_offset_minutes, 45);
        assert!(prefs.reminders_enabled);
        assert_eq!(
            prefs.quiet_hours,
            Some(QuietHours {
                start: config.quiet_hours_start,
                end: config.quiet_hours_end,
            })
        );
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let mut prefs = UserPrefs::defaults_for("mom", &config);
        prefs.reminders_enabled = false;
        prefs.quiet_hours = None;
        prefs.save(dir.path()).unwrap();

        let loaded = UserPrefs::load_or_default(dir.path(), "mom", &config).unwrap();
        assert!(!loaded.reminders_enabled);
        assert!(loaded.quiet_hours.is_none());
    }

    #[test]
    fn invalid_user_id_rejected() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        assert!(UserPrefs::load_or_default(dir.path(), "Not Valid", &config).is_err());
    }
}
