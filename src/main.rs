//! Countdown Hub - A single authoritative countdown timer for many display surfaces
//!
//! This is the main entry point for the countdown-hub server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_hub::{
    api::create_router,
    config::Config,
    services::{PresetStore, SessionHistory, PRESETS_FILE, SESSIONS_FILE},
    state::AppState,
    tasks::console_surface_task,
    timer::{Command, SystemClock, TimerCore},
    utils::{format_clock, shutdown_signal},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_hub={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-hub server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, default={}",
          config.host, config.port, format_clock(config.default_seconds()));

    // Presets and session history live side by side in the data directory
    let (presets, sessions) = match config.storage_dir() {
        Some(dir) => {
            info!("Data directory: {}", dir.display());
            (
                PresetStore::open(dir.join(PRESETS_FILE)),
                SessionHistory::open(dir.join(SESSIONS_FILE)),
            )
        }
        None => {
            info!("Persistence disabled, keeping presets and sessions in memory");
            (PresetStore::in_memory(), SessionHistory::in_memory())
        }
    };

    // Create the timer core and wire it to the hub
    let core = TimerCore::new(config.default_seconds(), Arc::new(SystemClock));
    let state = AppState::launch(
        core,
        presets,
        Arc::new(sessions),
        config.host.clone(),
        config.port,
    );

    if config.console {
        tokio::spawn(console_surface_task(Arc::clone(&state.hub)));
    }

    if config.auto_start {
        info!("Auto-start requested, starting countdown");
        state.run_command(Command::Start).await?;
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/set|start|pause|reset - Timer commands");
    info!("  POST /timer/command               - Any command as {{\"action\": ...}}");
    info!("  GET  /timer/state                 - Current snapshot");
    info!("  GET  /surfaces/:kind/events       - Register a main|pip|tiny surface (SSE)");
    info!("  GET  /presets, /sessions, /status, /health");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
