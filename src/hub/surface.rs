//! Client-side projection of the broadcast state
//!
//! A surface renders from the last snapshot the hub sent. It may guess the
//! outcome of its own command for responsiveness, but the next broadcast
//! always replaces the guess outright.

use super::SurfaceKind;
use crate::{state::TimerState, timer::Command, utils::format_clock};

#[derive(Debug, Clone)]
pub struct SurfaceView {
    kind: SurfaceKind,
    state: TimerState,
    speculative: bool,
}

impl SurfaceView {
    pub fn new(kind: SurfaceKind) -> Self {
        Self {
            kind,
            state: TimerState::default(),
            speculative: false,
        }
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    /// What the surface currently shows
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// True while showing a local guess that no broadcast has confirmed yet
    pub fn is_speculative(&self) -> bool {
        self.speculative
    }

    /// Adopt an authoritative snapshot, discarding any local guess
    pub fn apply_broadcast(&mut self, state: TimerState) {
        self.state = state;
        self.speculative = false;
    }

    /// Optimistically show the likely effect of a command just sent
    pub fn predict(&mut self, command: &Command) {
        let guess = match *command {
            Command::Start if self.state.time_left > 0 => TimerState { is_running: true, ..self.state },
            Command::Pause => TimerState { is_running: false, ..self.state },
            Command::Reset => TimerState::stopped(self.state.total_time),
            Command::SetTime { minutes, seconds } => {
                let minutes = u64::try_from(minutes).unwrap_or(0);
                let seconds = u64::try_from(seconds).unwrap_or(0);
                TimerState::stopped(minutes.saturating_mul(60).saturating_add(seconds))
            }
            Command::Start | Command::GetState => return,
        };
        self.state = guess;
        self.speculative = true;
    }

    /// Whether a start control should be enabled
    pub fn can_start(&self) -> bool {
        !self.state.is_running && self.state.time_left > 0
    }

    /// Single-line rendering, e.g. `[pip] 04:59 running 1%`
    pub fn render(&self) -> String {
        let status = if self.state.is_running {
            "running"
        } else if self.state.is_finished() && self.state.total_time > 0 {
            "done"
        } else {
            "paused"
        };
        format!(
            "[{}] {} {} {:.0}%",
            self.kind,
            format_clock(self.state.time_left),
            status,
            self.state.progress() * 100.0
        )
    }
}
