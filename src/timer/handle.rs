//! Command channel into the timer loop

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::debug;

use super::{command::Command, core::TimerCore};
use crate::{
    state::{TimerEvent, TimerState},
    tasks::timer_loop_task,
};

/// Capacity of the command queue
pub const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// The timer loop has exited and can no longer take commands
#[derive(Debug, Clone, Copy, Error)]
#[error("timer loop is no longer running")]
pub struct TimerStopped;

/// A command plus the optional reply slot for request/response calls
#[derive(Debug)]
pub struct TimerRequest {
    pub command: Command,
    pub reply: Option<oneshot::Sender<TimerState>>,
}

/// Cloneable handle for issuing commands to the timer loop
#[derive(Debug, Clone)]
pub struct TimerHandle {
    requests_tx: mpsc::Sender<TimerRequest>,
    latest_rx: watch::Receiver<TimerState>,
    events_tx: broadcast::Sender<TimerEvent>,
}

impl TimerHandle {
    /// Move `core` into its own loop task and return a handle to it
    pub fn spawn(core: TimerCore) -> Self {
        let (requests_tx, requests_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let handle = Self {
            requests_tx,
            latest_rx: core.watch(),
            events_tx: core.event_sender(),
        };

        tokio::spawn(timer_loop_task(core, requests_rx));
        handle
    }

    /// Subscribe to core events from this point on
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events_tx.subscribe()
    }

    /// Latest snapshot, read without a round trip through the loop
    pub fn get_state(&self) -> TimerState {
        *self.latest_rx.borrow()
    }

    /// Run a command and wait for the resulting snapshot.
    ///
    /// The core has already emitted its event when this returns.
    pub async fn execute(&self, command: Command) -> Result<TimerState, TimerStopped> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests_tx
            .send(TimerRequest { command, reply: Some(reply_tx) })
            .await
            .map_err(|_| TimerStopped)?;
        reply_rx.await.map_err(|_| TimerStopped)
    }

    /// Queue a command without waiting for its result
    pub async fn send(&self, command: Command) -> Result<(), TimerStopped> {
        debug!("Queueing fire-and-forget command: {}", command.name());
        self.requests_tx
            .send(TimerRequest { command, reply: None })
            .await
            .map_err(|_| TimerStopped)
    }

    pub async fn set_time(&self, minutes: i64, seconds: i64) -> Result<TimerState, TimerStopped> {
        self.execute(Command::SetTime { minutes, seconds }).await
    }

    pub async fn start(&self) -> Result<TimerState, TimerStopped> {
        self.execute(Command::Start).await
    }

    pub async fn pause(&self) -> Result<TimerState, TimerStopped> {
        self.execute(Command::Pause).await
    }

    pub async fn reset(&self) -> Result<TimerState, TimerStopped> {
        self.execute(Command::Reset).await
    }

    /// Snapshot read serialized behind every command queued before it
    pub async fn state(&self) -> Result<TimerState, TimerStopped> {
        self.execute(Command::GetState).await
    }
}
