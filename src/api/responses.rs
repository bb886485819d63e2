//! API response structures

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    hub::{DisplayMode, HubError, SurfaceInfo},
    services::StoreError,
    state::TimerState,
};

/// Response for every timer command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: String,
    pub command: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerState,
}

impl CommandResponse {
    /// Build a response whose status reflects the resulting snapshot
    pub fn new(command: &str, timer: TimerState) -> Self {
        let status = if timer.is_running {
            "running"
        } else if timer.is_finished() {
            "idle"
        } else if timer.time_left == timer.total_time {
            "ready"
        } else {
            "paused"
        };

        Self {
            status: status.to_string(),
            command: command.to_string(),
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Live surfaces and the current display mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfacesResponse {
    pub mode: DisplayMode,
    pub surfaces: Vec<SurfaceInfo>,
}

/// Status response with timer and hub information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerState,
    pub display: String,
    pub mode: DisplayMode,
    pub surfaces: usize,
    pub completed_sessions: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_command: Option<String>,
    pub last_command_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// JSON body returned with every error status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned from handlers, rendered as a status code plus JSON message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<HubError> for ApiError {
    fn from(e: HubError) -> Self {
        let status = match e {
            HubError::AlreadyOpen(_) | HubError::ModeConflict { .. } => StatusCode::CONFLICT,
            HubError::UnknownSurface(_) => StatusCode::NOT_FOUND,
            HubError::TimerStopped(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match e {
            StoreError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!("Request failed: {}", self.message);
        }
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_status_follows_snapshot() {
        let status = |time_left, is_running| {
            CommandResponse::new("x", TimerState { time_left, total_time: 60, is_running }).status
        };
        assert_eq!(status(60, false), "ready");
        assert_eq!(status(59, true), "running");
        assert_eq!(status(30, false), "paused");
        assert_eq!(status(0, false), "idle");
        assert_eq!(CommandResponse::new("setTime", TimerState::stopped(0)).status, "idle");
    }
}
