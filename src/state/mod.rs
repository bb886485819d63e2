//! State management module
//!
//! The timer snapshot and event types, and the shared application state.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use timer_state::{TimerEvent, TimerState};
