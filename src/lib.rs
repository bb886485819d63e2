//! Countdown Hub - A single authoritative countdown timer for many display surfaces
//!
//! One timer core owns the countdown and derives remaining time from a
//! wall-clock target. A broadcast hub fans every state change out to the main,
//! picture-in-picture, and tiny surfaces, and routes their commands back in.

pub mod api;
pub mod config;
pub mod hub;
pub mod services;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use hub::{BroadcastHub, DisplayMode, HubError, SurfaceKind};
pub use state::{AppState, TimerEvent, TimerState};
pub use timer::{Command, TimerCore, TimerHandle};
pub use utils::signals::shutdown_signal;
