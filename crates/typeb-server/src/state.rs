use std::path::PathBuf;
use std::sync::Arc;
use typeb_core::dispatch::{LogSink, NotificationSink};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    /// Where fired reminders go. The default logs; tests inject a capture.
    pub sink: Arc<dyn NotificationSink>,
}

impl AppState {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            sink: Arc::new(LogSink),
        }
    }

    pub fn with_sink(root: PathBuf, sink: Arc<dyn NotificationSink>) -> Self {
        Self { root, sink }
    }
}
