//! Surface registry and snapshot fan-out

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use super::{CompletionHook, DisplayMode, HubError, SurfaceId, SurfaceKind};
use crate::{
    state::{TimerEvent, TimerState},
    timer::{Command, TimerHandle},
};

/// Public description of a live surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceInfo {
    pub id: SurfaceId,
    pub kind: SurfaceKind,
    pub opened_at: DateTime<Utc>,
}

/// What a newly registered surface gets back
#[derive(Debug)]
pub struct SurfaceRegistration {
    pub id: SurfaceId,
    pub kind: SurfaceKind,
    /// Latest full snapshot; holds the state at registration time until the next broadcast
    pub updates: watch::Receiver<TimerState>,
}

#[derive(Debug)]
struct SurfaceEntry {
    info: SurfaceInfo,
    tx: watch::Sender<TimerState>,
}

#[derive(Debug, Default)]
struct Registry {
    mode: DisplayMode,
    main: Option<SurfaceId>,
    surfaces: BTreeMap<SurfaceId, SurfaceEntry>,
}

impl Registry {
    fn remove(&mut self, id: SurfaceId) -> Option<SurfaceInfo> {
        let entry = self.surfaces.remove(&id)?;
        self.mode = self.mode.close(entry.info.kind);
        if self.main == Some(id) {
            self.main = None;
        }
        Some(entry.info)
    }
}

/// Fans timer state out to every live display surface.
///
/// The hub holds the only handle to the timer core; surfaces reach the core
/// exclusively through [`BroadcastHub::dispatch`].
pub struct BroadcastHub {
    timer: TimerHandle,
    registry: Mutex<Registry>,
    next_id: AtomicU64,
    completion_hooks: Vec<Arc<dyn CompletionHook>>,
}

impl BroadcastHub {
    pub fn new(timer: TimerHandle) -> Self {
        Self {
            timer,
            registry: Mutex::new(Registry::default()),
            next_id: AtomicU64::new(1),
            completion_hooks: Vec::new(),
        }
    }

    /// Register a side effect for completed countdowns
    pub fn with_completion_hook(mut self, hook: Arc<dyn CompletionHook>) -> Self {
        self.completion_hooks.push(hook);
        self
    }

    /// Subscribe to the core's event stream
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.timer.subscribe()
    }

    /// Latest snapshot, read synchronously
    pub fn get_state(&self) -> TimerState {
        self.timer.get_state()
    }

    /// Forward a surface's command to the core and return the resulting snapshot
    pub async fn dispatch(&self, command: Command) -> Result<TimerState, HubError> {
        debug!("Dispatching {} to timer core", command.name());
        Ok(self.timer.execute(command).await?)
    }

    /// Register a new surface, subject to the display-mode rules
    pub fn open_surface(&self, kind: SurfaceKind) -> Result<SurfaceRegistration, HubError> {
        let mut registry = self.registry();

        if kind == SurfaceKind::Main && registry.main.is_some() {
            return Err(HubError::AlreadyOpen(SurfaceKind::Main));
        }
        let mode = registry.mode.open(kind)?;

        let id = SurfaceId(self.next_id.fetch_add(1, Ordering::Relaxed));
        // A fresh surface is consistent immediately, not at the next tick
        let (tx, updates) = watch::channel(self.timer.get_state());

        registry.mode = mode;
        if kind == SurfaceKind::Main {
            registry.main = Some(id);
        }
        registry.surfaces.insert(
            id,
            SurfaceEntry {
                info: SurfaceInfo { id, kind, opened_at: Utc::now() },
                tx,
            },
        );

        info!("Opened {} surface {} (mode: {:?})", kind, id, registry.mode);
        Ok(SurfaceRegistration { id, kind, updates })
    }

    /// Deregister a surface; no further snapshots are sent to it
    pub fn close_surface(&self, id: SurfaceId) -> Result<SurfaceInfo, HubError> {
        let mut registry = self.registry();
        let info = registry.remove(id).ok_or(HubError::UnknownSurface(id))?;
        info!("Closed {} surface {} (mode: {:?})", info.kind, id, registry.mode);
        Ok(info)
    }

    /// Send a full snapshot to every live surface and return how many took it.
    ///
    /// Surfaces whose receiver is gone are deregistered. A surface that has not
    /// read the previous snapshot yet only ever sees the newest one.
    pub fn broadcast(&self, state: TimerState) -> usize {
        let mut registry = self.registry();
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, entry) in &registry.surfaces {
            if entry.tx.send(state).is_ok() {
                delivered += 1;
            } else {
                closed.push(*id);
            }
        }

        for id in closed {
            if let Some(info) = registry.remove(id) {
                debug!("Pruned closed {} surface {}", info.kind, id);
            }
        }

        delivered
    }

    /// Handle one core event: fan it out, then run completion hooks
    pub fn handle_event(&self, event: TimerEvent) {
        let delivered = self.broadcast(event.state());

        if let TimerEvent::Complete(state) = event {
            info!("Countdown complete, notifying {} hook(s) and {} surface(s)",
                  self.completion_hooks.len(), delivered);
            for hook in &self.completion_hooks {
                debug!("Running completion hook: {}", hook.name());
                hook.on_complete(&state);
            }
        }
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.registry().mode
    }

    /// Live surfaces in registration order
    pub fn surfaces(&self) -> Vec<SurfaceInfo> {
        self.registry()
            .surfaces
            .values()
            .map(|entry| entry.info.clone())
            .collect()
    }

    pub fn surface_count(&self) -> usize {
        self.registry().surfaces.len()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Registry updates are single assignments, so a poisoned lock still holds valid data
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastHub")
            .field("mode", &self.display_mode())
            .field("surfaces", &self.surface_count())
            .field("completion_hooks", &self.completion_hooks.len())
            .finish()
    }
}

/// Deregisters its surface when dropped, e.g. when a client disconnects
#[derive(Debug)]
pub struct SurfaceGuard {
    hub: Arc<BroadcastHub>,
    id: SurfaceId,
}

impl SurfaceGuard {
    pub fn new(hub: Arc<BroadcastHub>, id: SurfaceId) -> Self {
        Self { hub, id }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        // Already gone if it was closed explicitly or pruned during a broadcast
        if self.hub.close_surface(self.id).is_err() {
            debug!("Surface {} was already deregistered", self.id);
        }
    }
}
