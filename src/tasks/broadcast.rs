//! Broadcast background task

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use crate::{
    hub::BroadcastHub,
    state::{TimerEvent, TimerState},
};

/// Forward every core event to the hub until the core goes away
pub async fn broadcast_task(hub: Arc<BroadcastHub>, mut events_rx: broadcast::Receiver<TimerEvent>) {
    info!("Starting broadcast task");
    // Final state of the last completion the hooks have seen
    let mut last_complete: Option<TimerState> = None;

    loop {
        match events_rx.recv().await {
            Ok(event) => {
                if event.is_complete() {
                    last_complete = Some(event.state());
                } else if !event.state().is_finished() {
                    last_complete = None;
                }
                hub.handle_event(event);
            }
            Err(RecvError::Lagged(skipped)) => {
                // Snapshots are full state, so catching up to the latest is enough for surfaces
                let latest = hub.get_state();
                if latest.is_completed_run() && last_complete != Some(latest) {
                    warn!("Broadcast task lagged by {} events across a completion, replaying it", skipped);
                    last_complete = Some(latest);
                    hub.handle_event(TimerEvent::Complete(latest));
                } else {
                    warn!("Broadcast task lagged by {} events, resynchronizing", skipped);
                    hub.broadcast(latest);
                }
            }
            Err(RecvError::Closed) => {
                info!("Timer event stream closed, stopping broadcast task");
                break;
            }
        }
    }
}
