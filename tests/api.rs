//! HTTP API tests driven through the router without binding a socket

use std::sync::Arc;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use countdown_hub::{
    create_router,
    services::{PresetStore, SessionHistory},
    timer::{SystemClock, TimerCore},
    AppState,
};

fn app(default_seconds: u64) -> (Router, Arc<AppState>) {
    let state = AppState::launch(
        TimerCore::new(default_seconds, Arc::new(SystemClock)),
        PresetStore::in_memory(),
        Arc::new(SessionHistory::in_memory()),
        "127.0.0.1".to_string(),
        0,
    );
    (create_router(Arc::clone(&state)), state)
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request(method, uri, body)).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_set_time_coerces_loose_input() {
    let (app, _state) = app(60);

    let (status, body) = send(&app, Method::POST, "/timer/set",
        Some(json!({"minutes": "2", "seconds": -5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["command"], "setTime");
    assert_eq!(body["timer"], json!({"timeLeft": 120, "totalTime": 120, "isRunning": false}));

    let (_, body) = send(&app, Method::POST, "/timer/set",
        Some(json!({"minutes": "soon", "seconds": 7.9}))).await;
    assert_eq!(body["timer"]["totalTime"], 7);
}

#[tokio::test]
async fn test_start_pause_reset_cycle() {
    let (app, _state) = app(90);

    let (_, body) = send(&app, Method::POST, "/timer/start", None).await;
    assert_eq!(body["status"], "running");
    assert_eq!(body["timer"]["isRunning"], true);

    let (_, body) = send(&app, Method::POST, "/timer/pause", None).await;
    assert_eq!(body["timer"]["isRunning"], false);
    let paused_at = body["timer"]["timeLeft"].as_u64().unwrap();
    assert!(paused_at == 90 || paused_at == 89);

    let (_, body) = send(&app, Method::POST, "/timer/command", Some(json!({"action": "reset"}))).await;
    assert_eq!(body["timer"], json!({"timeLeft": 90, "totalTime": 90, "isRunning": false}));

    let (status, body) = send(&app, Method::GET, "/timer/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timeLeft"], 90);
}

#[tokio::test]
async fn test_start_at_zero_reports_idle() {
    let (app, _state) = app(0);
    let (status, body) = send(&app, Method::POST, "/timer/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");
    assert_eq!(body["timer"]["isRunning"], false);
}

#[tokio::test]
async fn test_unknown_command_is_rejected() {
    let (app, _state) = app(60);
    let (status, body) = send(&app, Method::POST, "/timer/command", Some(json!({"action": "launch"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("launch"), "{}", body);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/timer/set")
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_set_time_reports_ready_until_started() {
    let (app, _state) = app(60);
    let (_, body) = send(&app, Method::POST, "/timer/set", Some(json!({"minutes": 1}))).await;
    assert_eq!(body["status"], "ready");

    let (_, body) = send(&app, Method::POST, "/timer/reset", None).await;
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_surface_stream_registers_and_enforces_exclusivity() {
    let (app, state) = app(300);

    let pip = app.clone().oneshot(request(Method::GET, "/surfaces/pip/events", None)).await.unwrap();
    assert_eq!(pip.status(), StatusCode::OK);

    let mut frames = pip.into_body().into_data_stream();
    let hello = String::from_utf8(frames.next().await.unwrap().unwrap().to_vec()).unwrap();
    assert!(hello.contains("event: registered"), "{}", hello);
    let first = String::from_utf8(frames.next().await.unwrap().unwrap().to_vec()).unwrap();
    assert!(first.contains("event: timer"), "{}", first);
    assert!(first.contains(r#""timeLeft":300"#), "{}", first);

    let (status, body) = send(&app, Method::GET, "/surfaces", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], json!({"mode": "pip"}));
    assert_eq!(body["surfaces"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/surfaces/tiny/events", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Disconnecting the PiP client frees the slot
    drop(frames);
    assert_eq!(state.hub.surface_count(), 0);
    let tiny = app.clone().oneshot(request(Method::GET, "/surfaces/tiny/events", None)).await.unwrap();
    assert_eq!(tiny.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_surface_receives_command_broadcast() {
    let (app, _state) = app(300);
    let main = app.clone().oneshot(request(Method::GET, "/surfaces/main/events", None)).await.unwrap();
    let mut frames = main.into_body().into_data_stream();
    frames.next().await.unwrap().unwrap();
    frames.next().await.unwrap().unwrap();

    send(&app, Method::POST, "/timer/set", Some(json!({"minutes": 0, "seconds": 42}))).await;

    let update = String::from_utf8(frames.next().await.unwrap().unwrap().to_vec()).unwrap();
    assert!(update.contains(r#""timeLeft":42"#), "{}", update);
    assert!(update.contains(r#""isRunning":false"#), "{}", update);
}

#[tokio::test]
async fn test_bad_surface_kind_and_unknown_id() {
    let (app, _state) = app(60);
    let (status, _) = send(&app, Method::GET, "/surfaces/sidebar/events", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::DELETE, "/surfaces/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn test_presets_lifecycle() {
    let (app, _state) = app(60);

    let (_, body) = send(&app, Method::GET, "/presets", None).await;
    assert_eq!(body.as_array().unwrap().len(), 4);
    assert_eq!(body[1], json!({"name": "Pomodoro", "minutes": 25}));

    let (status, body) = send(&app, Method::POST, "/presets", Some(json!({"name": " Tea ", "minutes": "3"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body[4], json!({"name": "Tea", "minutes": 3}));

    let (status, _) = send(&app, Method::POST, "/presets", Some(json!({"name": "Nothing", "minutes": 0}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send(&app, Method::POST, "/presets/1/apply", None).await;
    assert_eq!(body["timer"], json!({"timeLeft": 1500, "totalTime": 1500, "isRunning": false}));

    let (status, body) = send(&app, Method::DELETE, "/presets/0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Quick Break");

    let (status, _) = send(&app, Method::DELETE, "/presets/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::POST, "/presets/9/apply", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_and_health() {
    let (app, _state) = app(25 * 60);
    send(&app, Method::POST, "/timer/reset", None).await;

    let (status, body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display"], "25:00");
    assert_eq!(body["last_command"], "reset");
    assert_eq!(body["surfaces"], 0);
    assert_eq!(body["completed_sessions"], 0);

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (_, body) = send(&app, Method::GET, "/sessions", None).await;
    assert_eq!(body, json!([]));
}
