//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::{
    hub::SurfaceId,
    services::{CompletedSession, Preset, StoreError},
    state::{AppState, TimerState},
    timer::{coerce_component, Command},
    utils::format_clock,
};
use super::responses::{
    ApiError, CommandResponse, HealthResponse, StatusResponse, SurfacesResponse,
};

/// Body of POST /timer/set; any JSON type is accepted for either component
#[derive(Debug, Default, Deserialize)]
pub struct SetTimeRequest {
    #[serde(default)]
    pub minutes: Value,
    #[serde(default)]
    pub seconds: Value,
}

/// Body of POST /presets
#[derive(Debug, Default, Deserialize)]
pub struct PresetRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub minutes: Value,
    #[serde(default)]
    pub seconds: Value,
}

/// Run a store write on the blocking pool, off the async workers
async fn blocking<T, F>(write: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(write).await.map_err(|e| {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("store task failed: {}", e))
    })?;
    Ok(result?)
}

async fn run(state: &AppState, command: Command) -> Result<Json<CommandResponse>, ApiError> {
    let timer = state.run_command(command).await?;
    Ok(Json(CommandResponse::new(command.name(), timer)))
}

/// Handle POST /timer/command - Run any command from the command table
pub async fn command_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Command>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let Json(command) = payload?;
    run(&state, command).await
}

/// Handle POST /timer/set - Authoritatively set the countdown length
pub async fn set_time_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetTimeRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let Json(request) = payload?;
    let command = Command::SetTime {
        minutes: coerce_component(&request.minutes),
        seconds: coerce_component(&request.seconds),
    };
    run(&state, command).await
}

/// Handle POST /timer/start - Begin or resume the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<CommandResponse>, ApiError> {
    run(&state, Command::Start).await
}

/// Handle POST /timer/pause - Freeze the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<CommandResponse>, ApiError> {
    run(&state, Command::Pause).await
}

/// Handle POST /timer/reset - Restore the configured time
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<CommandResponse>, ApiError> {
    run(&state, Command::Reset).await
}

/// Handle GET /timer/state - Current snapshot
pub async fn state_handler(State(state): State<Arc<AppState>>) -> Json<TimerState> {
    Json(state.get_timer_state())
}

/// Handle GET /surfaces - Live surfaces and display mode
pub async fn surfaces_handler(State(state): State<Arc<AppState>>) -> Json<SurfacesResponse> {
    Json(SurfacesResponse {
        mode: state.hub.display_mode(),
        surfaces: state.hub.surfaces(),
    })
}

/// Handle DELETE /surfaces/:surface - Close a surface by id
pub async fn close_surface_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let info = state.hub.close_surface(SurfaceId(id))?;
    info!("Surface {} ({}) closed by request", info.id, info.kind);
    Ok(StatusCode::NO_CONTENT)
}

/// Handle GET /presets - List presets
pub async fn list_presets_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Preset>> {
    Json(state.presets.list())
}

/// Handle POST /presets - Append a preset
pub async fn add_preset_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PresetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<Preset>>), ApiError> {
    let Json(request) = payload?;
    let minutes = u64::try_from(coerce_component(&request.minutes)).unwrap_or(0);
    let seconds = u64::try_from(coerce_component(&request.seconds)).unwrap_or(0);
    if minutes == 0 && seconds == 0 {
        return Err(ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "preset duration must be positive"));
    }

    let name = request
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format_clock(minutes.saturating_mul(60).saturating_add(seconds)));

    let store = Arc::clone(&state.presets);
    let presets = blocking(move || store.add(Preset { name, minutes, seconds })).await?;
    Ok((StatusCode::CREATED, Json(presets)))
}

/// Handle DELETE /presets/:index - Remove a preset
pub async fn delete_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<Preset>, ApiError> {
    let store = Arc::clone(&state.presets);
    Ok(Json(blocking(move || store.delete(index)).await?))
}

/// Handle POST /presets/:index/apply - Set the timer from a preset
pub async fn apply_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<CommandResponse>, ApiError> {
    let preset = state
        .presets
        .get(index)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("no preset at index {}", index)))?;

    info!("Applying preset '{}'", preset.name);
    let command = Command::SetTime {
        minutes: i64::try_from(preset.minutes).unwrap_or(i64::MAX),
        seconds: i64::try_from(preset.seconds).unwrap_or(i64::MAX),
    };
    run(&state, command).await
}

/// Handle GET /sessions - Completed session history
pub async fn sessions_handler(State(state): State<Arc<AppState>>) -> Json<Vec<CompletedSession>> {
    Json(state.sessions.list())
}

/// Handle GET /status - Return current timer and hub status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let timer = state.get_timer_state();
    let (last_command, last_command_time) = state.get_last_command();

    Json(StatusResponse {
        timer,
        display: format_clock(timer.time_left),
        mode: state.hub.display_mode(),
        surfaces: state.hub.surface_count(),
        completed_sessions: state.sessions.list().len(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_command,
        last_command_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
