//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    hub::{BroadcastHub, HubError},
    services::{LogNotifier, PresetStore, SessionHistory},
    tasks::broadcast_task,
    timer::{Command, TimerCore, TimerHandle},
};
use super::TimerState;

/// Shared state handed to every HTTP handler
#[derive(Debug)]
pub struct AppState {
    /// Fan-out hub; holds the only handle to the timer core
    pub hub: Arc<BroadcastHub>,
    pub presets: Arc<PresetStore>,
    pub sessions: Arc<SessionHistory>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last command tracking
    pub last_command: Arc<Mutex<Option<String>>>,
    pub last_command_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Wire the timer loop, the hub, and the broadcast task together.
    ///
    /// Must be called inside a tokio runtime.
    pub fn launch(
        core: TimerCore,
        presets: PresetStore,
        sessions: Arc<SessionHistory>,
        host: String,
        port: u16,
    ) -> Arc<Self> {
        let timer = TimerHandle::spawn(core);
        let hub = Arc::new(
            BroadcastHub::new(timer)
                .with_completion_hook(sessions.clone())
                .with_completion_hook(Arc::new(LogNotifier::default())),
        );

        // Subscribe before spawning so no event between here and the first poll is lost
        let events_rx = hub.subscribe();
        tokio::spawn(broadcast_task(Arc::clone(&hub), events_rx));
        info!("Timer core and broadcast hub running");

        Arc::new(Self {
            hub,
            presets: Arc::new(presets),
            sessions,
            start_time: Instant::now(),
            port,
            host,
            last_command: Arc::new(Mutex::new(None)),
            last_command_time: Arc::new(Mutex::new(None)),
        })
    }

    /// Route a command through the hub, tracking it as the last command
    pub async fn run_command(&self, command: Command) -> Result<TimerState, HubError> {
        if command.is_mutation() {
            if let Ok(mut last_command) = self.last_command.lock() {
                *last_command = Some(command.name().to_string());
            }
            if let Ok(mut last_time) = self.last_command_time.lock() {
                *last_time = Some(Utc::now());
            }
        }

        self.hub.dispatch(command).await
    }

    /// Latest timer snapshot
    pub fn get_timer_state(&self) -> TimerState {
        self.hub.get_state()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last command information
    pub fn get_last_command(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_command = self.last_command.lock().ok().and_then(|c| c.clone());
        let last_command_time = self.last_command_time.lock().ok().and_then(|t| *t);
        (last_command, last_command_time)
    }
}
