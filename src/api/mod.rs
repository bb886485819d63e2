//! HTTP API module
//!
//! The command channel, surface event streams, presets, and status endpoints.

pub mod events;
pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use events::surface_events_handler;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/state", get(state_handler))
        .route("/timer/command", post(command_handler))
        .route("/timer/set", post(set_time_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/reset", post(reset_handler))
        // Both surface routes share the parameter name; the handlers parse it
        .route("/surfaces", get(surfaces_handler))
        .route("/surfaces/:surface", delete(close_surface_handler))
        .route("/surfaces/:surface/events", get(surface_events_handler))
        .route("/presets", get(list_presets_handler).post(add_preset_handler))
        .route("/presets/:index", delete(delete_preset_handler))
        .route("/presets/:index/apply", post(apply_preset_handler))
        .route("/sessions", get(sessions_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
