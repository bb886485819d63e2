//! The authoritative countdown engine
//!
//! `TimerCore` owns the only countdown in the process and the only periodic
//! tick source. Remaining time is always recomputed from a wall-clock target
//! end time, so a throttled or stalled scheduler cannot make the displayed time
//! drift from real elapsed time.

use std::{future, sync::Arc, time::Duration};
use tokio::{
    sync::{broadcast, watch},
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use super::{clock::Clock, command::Command};
use crate::state::{TimerEvent, TimerState};

/// Period of the countdown tick
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Capacity of the event channel; lagging subscribers only lose stale snapshots
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Single source of truth for the countdown
#[derive(Debug)]
pub struct TimerCore {
    time_left: u64,
    total_time: u64,
    is_running: bool,
    /// Wall-clock epoch millis at which the run reaches zero; set only while running
    target_end: Option<i64>,
    /// Armed only while running
    ticker: Option<Interval>,
    clock: Arc<dyn Clock>,
    events_tx: broadcast::Sender<TimerEvent>,
    latest_tx: watch::Sender<TimerState>,
}

impl TimerCore {
    /// Create a stopped core with `default_seconds` on the clock
    pub fn new(default_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (latest_tx, _) = watch::channel(TimerState::stopped(default_seconds));

        Self {
            time_left: default_seconds,
            total_time: default_seconds,
            is_running: false,
            target_end: None,
            ticker: None,
            clock,
            events_tx,
            latest_tx,
        }
    }

    /// Subscribe to every `Update` and `Complete` event
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events_tx.subscribe()
    }

    /// Clone of the event sender, for subscribing after the core has moved
    pub fn event_sender(&self) -> broadcast::Sender<TimerEvent> {
        self.events_tx.clone()
    }

    /// Watch the latest snapshot without waiting for an event
    pub fn watch(&self) -> watch::Receiver<TimerState> {
        self.latest_tx.subscribe()
    }

    /// Immutable snapshot of the current state
    pub fn state(&self) -> TimerState {
        TimerState {
            time_left: self.time_left,
            total_time: self.total_time,
            is_running: self.is_running,
        }
    }

    /// Whether a tick source is currently armed
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Apply a command and return the resulting snapshot
    pub fn apply(&mut self, command: Command) -> TimerState {
        match command {
            Command::SetTime { minutes, seconds } => self.set_time(minutes, seconds),
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Reset => self.reset(),
            Command::GetState => {}
        }
        self.state()
    }

    /// Stop any run and put `minutes*60 + seconds` on the clock.
    ///
    /// Negative components count as zero.
    pub fn set_time(&mut self, minutes: i64, seconds: i64) {
        let minutes = u64::try_from(minutes).unwrap_or(0);
        let seconds = u64::try_from(seconds).unwrap_or(0);
        let total = minutes.saturating_mul(60).saturating_add(seconds);

        self.stop();
        self.total_time = total;
        self.time_left = total;
        debug!("setTime: totalTime={}", total);
        self.emit_update();
    }

    /// Begin or resume the countdown from the current remaining time
    pub fn start(&mut self) {
        if self.is_running {
            return;
        }
        if self.time_left == 0 {
            // Nothing to run; re-emit so surfaces can reconcile their controls
            self.emit_update();
            return;
        }

        let now = self.clock.now_millis();
        let span = i64::try_from(self.time_left)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        let target = now.saturating_add(span);

        // Replacing the interval drops any previous tick source
        self.ticker = Some(Self::arm_ticker());
        self.target_end = Some(target);
        self.is_running = true;
        debug!("start: timeLeft={} target={}", self.time_left, target);
        self.emit_update();
    }

    /// Freeze the countdown at the exact remaining time
    pub fn pause(&mut self) {
        if !self.is_running {
            return;
        }
        if let Some(target) = self.target_end {
            self.time_left = self.remaining_until(target);
        }
        self.stop();
        debug!("pause: timeLeft={}", self.time_left);
        self.emit_update();
    }

    /// Stop and restore the full configured time
    pub fn reset(&mut self) {
        self.stop();
        self.time_left = self.total_time;
        debug!("reset: totalTime={}", self.total_time);
        self.emit_update();
    }

    /// Recompute the remaining time from the target end time
    pub fn tick(&mut self) {
        if !self.is_running {
            return;
        }
        let Some(target) = self.target_end else {
            warn!("Timer running without a target end time, stopping");
            self.stop();
            self.emit_update();
            return;
        };

        self.time_left = self.remaining_until(target);
        if self.time_left % 10 == 0 {
            debug!("tick: timeLeft={}", self.time_left);
        }

        if self.time_left == 0 {
            self.stop();
            self.emit_update();
            info!("Countdown complete after {}s", self.total_time);
            self.emit(TimerEvent::Complete(self.state()));
        } else {
            self.emit_update();
        }
    }

    /// Resolve at the next tick; pending forever while stopped
    pub async fn next_tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }

    fn arm_ticker() -> Interval {
        let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    }

    fn stop(&mut self) {
        self.ticker = None;
        self.target_end = None;
        self.is_running = false;
    }

    /// Remaining whole seconds, never more than before.
    ///
    /// A wall clock that stepped backwards would push the remaining time past
    /// its last value; the target is moved instead so the run continues from
    /// where it was.
    fn remaining_until(&mut self, target: i64) -> u64 {
        let remaining = self.whole_seconds_until(target);
        if remaining <= self.time_left {
            return remaining;
        }
        let span = i64::try_from(self.time_left)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        let rebased = self.clock.now_millis().saturating_add(span);
        warn!("Wall clock stepped back {}s, moving target end to {}", remaining - self.time_left, rebased);
        self.target_end = Some(rebased);
        self.time_left
    }

    fn whole_seconds_until(&self, target: i64) -> u64 {
        let remaining_ms = target.saturating_sub(self.clock.now_millis());
        if remaining_ms <= 0 {
            0
        } else {
            (remaining_ms / 1000) as u64
        }
    }

    fn emit_update(&self) {
        self.emit(TimerEvent::Update(self.state()));
    }

    fn emit(&self, event: TimerEvent) {
        self.latest_tx.send_replace(event.state());
        if self.events_tx.send(event).is_err() {
            debug!("No event subscribers for {:?}", event);
        }
    }
}
