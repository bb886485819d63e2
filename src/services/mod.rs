//! Collaborators of the timer core
//!
//! Preset storage, completed-session history, and the completion notifier.
//! None of these hold timer state; they react to the hub or feed it commands.

pub mod error;
pub mod notifier;
pub mod presets;
pub mod sessions;

// Re-export main types
pub use error::StoreError;
pub use notifier::LogNotifier;
pub use presets::{default_presets, Preset, PresetStore, PRESETS_FILE};
pub use sessions::{CompletedSession, SessionHistory, SESSIONS_FILE};
