//! Timer loop background task

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::timer::{TimerCore, TimerRequest};

/// Event loop that exclusively owns the timer core.
///
/// Commands and ticks are serialized here, so the core is never touched from
/// two places at once. A due tick is applied before any queued command.
pub async fn timer_loop_task(mut core: TimerCore, mut requests_rx: mpsc::Receiver<TimerRequest>) {
    info!("Starting timer loop");

    loop {
        tokio::select! {
            biased;

            _ = core.next_tick() => core.tick(),

            request = requests_rx.recv() => {
                let Some(TimerRequest { command, reply }) = request else {
                    info!("All timer handles dropped, stopping timer loop");
                    break;
                };

                let state = core.apply(command);
                if command.is_mutation() {
                    debug!("Applied {} -> {:?}", command.name(), state);
                }
                if let Some(reply) = reply {
                    if reply.send(state).is_err() {
                        debug!("Caller went away before {} reply", command.name());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::{
        state::{TimerEvent, TimerState},
        timer::{ManualClock, TimerCore, TimerHandle, TICK_PERIOD},
    };

    fn spawn_with_clock(default_seconds: u64) -> (TimerHandle, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let handle = TimerHandle::spawn(TimerCore::new(default_seconds, clock.clone()));
        (handle, clock)
    }

    async fn elapse(clock: &ManualClock, seconds: u64) {
        for _ in 0..seconds {
            clock.advance(TICK_PERIOD);
            tokio::time::advance(TICK_PERIOD).await;
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_runs_ten_second_countdown() {
        let (handle, clock) = spawn_with_clock(0);
        let mut events = handle.subscribe();

        handle.set_time(0, 10).await.unwrap();
        let started = handle.start().await.unwrap();
        assert!(started.is_running);

        elapse(&clock, 10).await;
        let state = handle.state().await.unwrap();
        assert_eq!(state, TimerState { time_left: 0, total_time: 10, is_running: false });

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }
        let running: Vec<u64> = received
            .iter()
            .map(TimerEvent::state)
            .filter(|s| s.is_running)
            .map(|s| s.time_left)
            .collect();
        assert_eq!(running.first(), Some(&10));
        assert!(running.windows(2).all(|pair| pair[1] <= pair[0]));
        assert_eq!(received.iter().filter(|e| e.is_complete()).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_follows_emitted_event() {
        let (handle, _clock) = spawn_with_clock(60);
        let mut events = handle.subscribe();

        let state = handle.set_time(0, 5).await.unwrap();

        // The event was broadcast before the reply came back
        assert_eq!(events.try_recv().unwrap(), TimerEvent::Update(state));
        assert_eq!(handle.get_state(), state);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_and_forget_is_applied_in_order() {
        let (handle, _clock) = spawn_with_clock(60);
        handle.send(crate::timer::Command::SetTime { minutes: 1, seconds: 5 }).await.unwrap();
        handle.send(crate::timer::Command::Start).await.unwrap();
        let state = handle.state().await.unwrap();
        assert_eq!(state.total_time, 65);
        assert!(state.is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_mid_run_through_loop() {
        let (handle, clock) = spawn_with_clock(0);
        handle.set_time(1, 0).await.unwrap();
        handle.start().await.unwrap();
        elapse(&clock, 30).await;
        let paused = handle.pause().await.unwrap();
        assert_eq!(paused.time_left, 30);
        assert!(!paused.is_running);

        // No tick source remains after pause
        tokio::time::advance(Duration::from_secs(5)).await;
        clock.advance(Duration::from_secs(5));
        assert_eq!(handle.state().await.unwrap(), paused);
    }
}
