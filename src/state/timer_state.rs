//! Timer snapshot and event types shared by the core, the hub, and every surface

use serde::{Deserialize, Serialize};

/// Immutable snapshot of the countdown, broadcast to every display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Seconds remaining in the current run
    pub time_left: u64,
    /// Seconds configured for the current run
    pub total_time: u64,
    /// True only while a countdown is ticking
    pub is_running: bool,
}

impl TimerState {
    /// Create a stopped timer with `total_time` seconds on the clock
    pub fn stopped(total_time: u64) -> Self {
        Self {
            time_left: total_time,
            total_time,
            is_running: false,
        }
    }

    /// Check whether the countdown has nothing left to run
    pub fn is_finished(&self) -> bool {
        self.time_left == 0
    }

    /// A run that counted all the way down, as left behind by a completion
    pub fn is_completed_run(&self) -> bool {
        !self.is_running && self.time_left == 0 && self.total_time > 0
    }

    /// Fraction of the run already elapsed, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        if self.total_time == 0 {
            return 0.0;
        }
        let elapsed = self.total_time.saturating_sub(self.time_left);
        elapsed as f64 / self.total_time as f64
    }
}

/// Events emitted by the timer core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "state", rename_all = "camelCase")]
pub enum TimerEvent {
    /// Any state mutation, and once per second while running
    Update(TimerState),
    /// The run reached zero; fires once per run
    Complete(TimerState),
}

impl TimerEvent {
    /// The snapshot carried by this event
    pub fn state(&self) -> TimerState {
        match self {
            TimerEvent::Update(state) | TimerEvent::Complete(state) => *state,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, TimerEvent::Complete(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_uses_camel_case_wire_names() {
        let state = TimerState { time_left: 30, total_time: 60, is_running: true };
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json, serde_json::json!({"timeLeft": 30, "totalTime": 60, "isRunning": true}));
    }

    #[test]
    fn test_progress() {
        assert_eq!(TimerState::stopped(0).progress(), 0.0);
        assert_eq!(TimerState::stopped(60).progress(), 0.0);
        let half = TimerState { time_left: 30, total_time: 60, is_running: true };
        assert!((half.progress() - 0.5).abs() < f64::EPSILON);
    }
}
