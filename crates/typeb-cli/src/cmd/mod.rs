pub mod config;
pub mod family;
pub mod init;
pub mod prefs;
pub mod remind;
pub mod schedule;
pub mod serve;
pub mod task;
