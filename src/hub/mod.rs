//! Broadcast hub module
//!
//! Tracks live display surfaces, fans every core event out to them as a full
//! snapshot, and routes their commands back into the timer core.

pub mod display_mode;
pub mod registry;
pub mod surface;

use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{state::TimerState, timer::TimerStopped};

// Re-export main types
pub use display_mode::{DisplayMode, SurfaceKind};
pub use registry::{BroadcastHub, SurfaceGuard, SurfaceInfo, SurfaceRegistration};
pub use surface::SurfaceView;

/// Identifier assigned to a surface when it registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors surfaced to callers of the hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("a {0} surface is already open")]
    AlreadyOpen(SurfaceKind),

    #[error("cannot open a {requested} surface while {active} surfaces are live")]
    ModeConflict {
        requested: SurfaceKind,
        active: SurfaceKind,
    },

    #[error("no live surface with id {0}")]
    UnknownSurface(SurfaceId),

    #[error(transparent)]
    TimerStopped(#[from] TimerStopped),
}

/// Side effect run once per completed countdown
pub trait CompletionHook: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    fn on_complete(&self, state: &TimerState);
}
