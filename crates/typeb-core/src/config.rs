use crate::error::Result;
use crate::io;
use crate::paths;
use crate::types::Plan;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// First reminder fires this many minutes before the due time, unless
    /// the task or the user's prefs override it.
    #[serde(default = "default_offset")]
    pub default_reminder_offset_minutes: u32,

    /// Quiet-hours window applied to users who have not set their own.
    #[serde(default = "default_quiet_start")]
    pub quiet_hours_start: NaiveTime,
    #[serde(default = "default_quiet_end")]
    pub quiet_hours_end: NaiveTime,

    /// Urgent-priority tasks fire inside quiet hours when true.
    #[serde(default = "default_urgent_override")]
    pub urgent_overrides_quiet_hours: bool,

    #[serde(default = "default_free_limit")]
    pub free_member_limit: u32,
    #[serde(default = "default_premium_limit")]
    pub premium_member_limit: u32,

    /// HMAC secret for the billing webhook. The TYPEB_WEBHOOK_SECRET env
    /// var takes precedence over this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
}

fn default_offset() -> u32 {
    30
}

fn default_quiet_start() -> NaiveTime {
    NaiveTime::from_hms_opt(21, 0, 0).unwrap()
}

fn default_quiet_end() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).unwrap()
}

fn default_urgent_override() -> bool {
    true
}

fn default_free_limit() -> u32 {
    5
}

fn default_premium_limit() -> u32 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_reminder_offset_minutes: default_offset(),
            quiet_hours_start: default_quiet_start(),
            quiet_hours_end: default_quiet_end(),
            urgent_overrides_quiet_hours: default_urgent_override(),
            free_member_limit: default_free_limit(),
            premium_member_limit: default_premium_limit(),
            webhook_secret: None,
        }
    }
}

impl Config {
    /// Load the config, falling back to defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        Ok(io::load_yaml(&paths::config_path(root))?.unwrap_or_default())
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::save_yaml(&paths::config_path(root), self)
    }

    pub fn member_limit(&self, plan: Plan) -> u32 {
        match plan {
            Plan::Free => self.free_member_limit,
            Plan::Premium => self.premium_member_limit,
        }
    }

    /// Resolve the webhook secret: env var wins over the config file.
    pub fn webhook_secret(&self) -> Option<String> {
        std::env::var("TYPEB_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.webhook_secret.clone())
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.free_member_limit == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "free_member_limit is 0: nobody can create a family".to_string(),
            });
        }
        if self.premium_member_limit < self.free_member_limit {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "premium_member_limit ({}) is below free_member_limit ({})",
                    self.premium_member_limit, self.free_member_limit
                ),
            });
        }
        if self.default_reminder_offset_minutes == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "default_reminder_offset_minutes is 0: the initial reminder \
                          collapses into the due-time alert"
                    .to_string(),
            });
        }
        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
