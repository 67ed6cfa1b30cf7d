use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypebError {
    #[error("not initialized: run 'typeb init'")]
    NotInitialized,

    #[error("family not found: {0}")]
    FamilyNotFound(String),

    #[error("family already exists: {0}")]
    FamilyExists(String),

    #[error("no family matches invite code '{0}'")]
    InvalidInviteCode(String),

    #[error("family is full: member limit of {limit} reached")]
    FamilyFull { limit: u32 },

    #[error("user '{0}' is already a member of this family")]
    AlreadyMember(String),

    #[error("member not found: {0}")]
    MemberNotFound(String),

    #[error("a family must keep at least one parent")]
    LastParent,

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("reminder entry not found: {0}")]
    EntryNotFound(String),

    #[error("task requires a photo to complete")]
    PhotoRequired,

    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("invalid id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidId(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("webhook signature missing or invalid")]
    WebhookSignature,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TypebError>;
