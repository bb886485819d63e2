//! Countdown engine module
//!
//! The core state machine, its wall-clock sources, the command vocabulary, and
//! the handle used to reach the core once it runs inside its loop task.

pub mod clock;
pub mod command;
pub mod core;
pub mod handle;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::{coerce_component, Command};
pub use self::core::{TimerCore, TICK_PERIOD};
pub use handle::{TimerHandle, TimerRequest, TimerStopped};
