//! In-process console surface

use std::sync::Arc;
use tracing::{info, warn};

use crate::hub::{BroadcastHub, SurfaceGuard, SurfaceKind, SurfaceView};

/// Register as the main surface and log every frame it would render
pub async fn console_surface_task(hub: Arc<BroadcastHub>) {
    let mut registration = match hub.open_surface(SurfaceKind::Main) {
        Ok(registration) => registration,
        Err(e) => {
            warn!("Console surface not started: {}", e);
            return;
        }
    };
    let _guard = SurfaceGuard::new(Arc::clone(&hub), registration.id);
    let mut view = SurfaceView::new(registration.kind);
    let mut last_frame = String::new();

    info!("Console surface {} attached", registration.id);
    loop {
        let snapshot = *registration.updates.borrow_and_update();
        view.apply_broadcast(snapshot);
        let frame = view.render();
        // Completion re-broadcasts the final state; skip identical frames
        if frame != last_frame {
            info!(target: "countdown_hub::console", "{}", frame);
            last_frame = frame;
        }
        if registration.updates.changed().await.is_err() {
            break;
        }
    }
    info!("Console surface {} detached", registration.id);
}
