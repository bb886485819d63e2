//! Completion notification

use tracing::info;

use crate::{hub::CompletionHook, state::TimerState, utils::format_duration};

/// Announces finished countdowns through the log
#[derive(Debug, Clone)]
pub struct LogNotifier {
    title: String,
}

impl LogNotifier {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }

    /// Notification body for a finished run
    pub fn message(&self, state: &TimerState) -> String {
        format!("{}: your {} countdown is complete", self.title, format_duration(state.total_time))
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new("Time's up!")
    }
}

impl CompletionHook for LogNotifier {
    fn name(&self) -> &str {
        "notifier"
    }

    fn on_complete(&self, state: &TimerState) {
        info!(target: "countdown_hub::notification", "{}", self.message(state));
    }
}
