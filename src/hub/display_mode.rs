//! Surface kinds and the PiP/tiny exclusivity state machine

use std::{fmt, str::FromStr};
use serde::{Deserialize, Serialize};

use super::HubError;

/// Kind of display surface a client registers as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// The main window; at most one
    Main,
    /// Picture-in-picture mini window; at most one, never alongside tiny windows
    Pip,
    /// Tiny always-on-top window; any number, never alongside PiP
    Tiny,
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SurfaceKind::Main => "main",
            SurfaceKind::Pip => "pip",
            SurfaceKind::Tiny => "tiny",
        };
        f.write_str(name)
    }
}

impl FromStr for SurfaceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" => Ok(SurfaceKind::Main),
            "pip" => Ok(SurfaceKind::Pip),
            "tiny" => Ok(SurfaceKind::Tiny),
            other => Err(format!("unknown surface kind: {}", other)),
        }
    }
}

/// Which secondary surfaces are live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "count", rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    None,
    Pip,
    Tiny(usize),
}

impl DisplayMode {
    /// Transition for a newly opened surface.
    ///
    /// The main surface does not take part in the exclusivity rule.
    pub fn open(self, kind: SurfaceKind) -> Result<Self, HubError> {
        match (self, kind) {
            (mode, SurfaceKind::Main) => Ok(mode),
            (DisplayMode::None, SurfaceKind::Pip) => Ok(DisplayMode::Pip),
            (DisplayMode::None, SurfaceKind::Tiny) => Ok(DisplayMode::Tiny(1)),
            (DisplayMode::Tiny(n), SurfaceKind::Tiny) => Ok(DisplayMode::Tiny(n + 1)),
            (DisplayMode::Pip, SurfaceKind::Pip) => Err(HubError::AlreadyOpen(SurfaceKind::Pip)),
            (DisplayMode::Pip, SurfaceKind::Tiny) => Err(HubError::ModeConflict {
                requested: SurfaceKind::Tiny,
                active: SurfaceKind::Pip,
            }),
            (DisplayMode::Tiny(_), SurfaceKind::Pip) => Err(HubError::ModeConflict {
                requested: SurfaceKind::Pip,
                active: SurfaceKind::Tiny,
            }),
        }
    }

    /// Transition for a surface that went away
    pub fn close(self, kind: SurfaceKind) -> Self {
        match (self, kind) {
            (DisplayMode::Pip, SurfaceKind::Pip) => DisplayMode::None,
            (DisplayMode::Tiny(n), SurfaceKind::Tiny) if n <= 1 => DisplayMode::None,
            (DisplayMode::Tiny(n), SurfaceKind::Tiny) => DisplayMode::Tiny(n - 1),
            (mode, _) => mode,
        }
    }
}
