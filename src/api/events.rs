//! Server-Sent-Events stream for display surfaces
//!
//! Opening the stream registers the client as a surface with the hub; the
//! connection closing deregisters it.

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;
use tracing::{info, trace};

use crate::{
    hub::{SurfaceGuard, SurfaceInfo, SurfaceKind},
    state::AppState,
};
use super::responses::ApiError;

/// Handle GET /surfaces/:surface/events - Register a surface and stream snapshots to it
pub async fn surface_events_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let kind: SurfaceKind = kind
        .parse()
        .map_err(|e: String| ApiError::new(StatusCode::BAD_REQUEST, e))?;

    let registration = state.hub.open_surface(kind)?;
    let guard = SurfaceGuard::new(Arc::clone(&state.hub), registration.id);
    info!("Streaming to {} surface {}", kind, registration.id);

    let registered = state
        .hub
        .surfaces()
        .into_iter()
        .find(|info| info.id == registration.id);
    let hello = stream::iter(registered.map(registered_event));

    // Yields the registration-time snapshot first, then the newest one after each broadcast
    let updates = WatchStream::new(registration.updates).map(move |snapshot| {
        // The guard lives as long as the stream does
        trace!("Snapshot for surface {}: {:?}", guard.id(), snapshot);
        Event::default().event("timer").json_data(snapshot)
    });

    Ok(Sse::new(hello.chain(updates)).keep_alive(KeepAlive::default()))
}

fn registered_event(info: SurfaceInfo) -> Result<Event, axum::Error> {
    Event::default().event("registered").json_data(info)
}
