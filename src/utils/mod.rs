//! Utility functions module
//!
//! This module contains utility functions used throughout the application.

pub mod format;
pub mod signals;

// Re-export main functions
pub use format::{format_clock, format_duration};
pub use signals::shutdown_signal;

/// Fresh, empty directory under the system temp dir for filesystem tests
#[cfg(test)]
pub(crate) fn scratch_dir(label: &str) -> std::path::PathBuf {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let dir = std::env::temp_dir()
        .join("countdown-hub-tests")
        .join(format!("{}-{}-{}", label, std::process::id(), nanos));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}
