use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Family roles. Parents are the manager role: they receive manager alerts
/// and can change membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Parent,
    Child,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Child => "child",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::TypebError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(Role::Parent),
            "child" => Ok(Role::Child),
            _ => Err(crate::error::TypebError::InvalidValue(format!(
                "unknown role '{s}': must be parent or child"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Task priority. `Urgent` participates in the quiet-hours policy: urgent
/// reminders fire at their computed times even inside a quiet window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = crate::error::TypebError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(crate::error::TypebError::InvalidValue(format!(
                "unknown priority '{s}': must be low, medium, high, or urgent"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// TaskCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Chores,
    Homework,
    Exercise,
    Routine,
    Personal,
    Other,
}

impl TaskCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskCategory::Chores => "chores",
            TaskCategory::Homework => "homework",
            TaskCategory::Exercise => "exercise",
            TaskCategory::Routine => "routine",
            TaskCategory::Personal => "personal",
            TaskCategory::Other => "other",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskCategory {
    type Err = crate::error::TypebError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chores" => Ok(TaskCategory::Chores),
            "homework" => Ok(TaskCategory::Homework),
            "exercise" => Ok(TaskCategory::Exercise),
            "routine" => Ok(TaskCategory::Routine),
            "personal" => Ok(TaskCategory::Personal),
            "other" => Ok(TaskCategory::Other),
            _ => Err(crate::error::TypebError::InvalidValue(format!(
                "unknown category '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Entitlement tier. Determines the family member limit at join time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Free,
    Premium,
}

impl Plan {
    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Premium => "premium",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Plan {
    type Err = crate::error::TypebError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "premium" => Ok(Plan::Premium),
            _ => Err(crate::error::TypebError::InvalidValue(format!(
                "unknown plan '{s}': must be free or premium"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ReminderLevel
// ---------------------------------------------------------------------------

/// The fixed four-rung escalation ladder: three pre-due reminders to the
/// assignee, then a manager alert to the parents at the due time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderLevel {
    Initial,
    FollowUp,
    FinalCall,
    ManagerAlert,
}

impl ReminderLevel {
    pub fn all() -> &'static [ReminderLevel] {
        &[
            ReminderLevel::Initial,
            ReminderLevel::FollowUp,
            ReminderLevel::FinalCall,
            ReminderLevel::ManagerAlert,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReminderLevel::Initial => "initial",
            ReminderLevel::FollowUp => "follow_up",
            ReminderLevel::FinalCall => "final_call",
            ReminderLevel::ManagerAlert => "manager_alert",
        }
    }

    /// Manager alerts route to the family's parents; everything else goes
    /// to the task assignee.
    pub fn targets_parents(self) -> bool {
        matches!(self, ReminderLevel::ManagerAlert)
    }
}

impl fmt::Display for ReminderLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReminderLevel {
    type Err = crate::error::TypebError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(ReminderLevel::Initial),
            "follow_up" => Ok(ReminderLevel::FollowUp),
            "final_call" => Ok(ReminderLevel::FinalCall),
            "manager_alert" => Ok(ReminderLevel::ManagerAlert),
            _ => Err(crate::error::TypebError::InvalidValue(format!(
                "unknown reminder level '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn level_ordering() {
        assert!(ReminderLevel::Initial < ReminderLevel::FollowUp);
        assert!(ReminderLevel::FinalCall < ReminderLevel::ManagerAlert);
    }

    #[test]
    fn level_roundtrip() {
        for level in ReminderLevel::all() {
            let parsed = ReminderLevel::from_str(level.as_str()).unwrap();
            assert_eq!(*level, parsed);
        }
    }

    #[test]
    fn manager_alert_targets_parents() {
        assert!(ReminderLevel::ManagerAlert.targets_parents());
        assert!(!ReminderLevel::Initial.targets_parents());
        assert!(!ReminderLevel::FinalCall.targets_parents());
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Low < Priority::Urgent);
        assert!(Priority::High < Priority::Urgent);
    }

    #[test]
    fn role_parse() {
        assert_eq!(Role::from_str("parent").unwrap(), Role::Parent);
        assert_eq!(Role::from_str("child").unwrap(), Role::Child);
        assert!(Role::from_str("manager").is_err());
    }

    #[test]
    fn plan_parse() {
        assert_eq!(Plan::from_str("free").unwrap(), Plan::Free);
        assert_eq!(Plan::from_str("premium").unwrap(), Plan::Premium);
        assert!(Plan::from_str("gold").is_err());
    }
}
