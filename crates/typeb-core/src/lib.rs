pub mod config;
pub mod dispatch;
pub mod entitlement;
pub mod error;
pub mod escalation;
pub mod family;
pub mod io;
pub mod paths;
pub mod prefs;
pub mod schedule;
pub mod task;
pub mod types;

pub use error::{Result, TypebError};
