//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "countdown-hub")]
#[command(about = "A single authoritative countdown timer broadcast to every live display surface")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20553")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Default countdown minutes at start-up
    #[arg(short, long, default_value = "25")]
    pub minutes: u64,

    /// Default countdown seconds at start-up, added to the minutes
    #[arg(short, long, default_value = "0")]
    pub seconds: u64,

    /// Start counting down as soon as the server is up
    #[arg(long)]
    pub auto_start: bool,

    /// Register an in-process main surface that logs every frame
    #[arg(long)]
    pub console: bool,

    /// Directory for presets and session history
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Keep presets and session history in memory only
    #[arg(long)]
    pub no_persist: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Default countdown length in seconds
    pub fn default_seconds(&self) -> u64 {
        self.minutes.saturating_mul(60).saturating_add(self.seconds)
    }

    /// Where presets and sessions are stored, or `None` when persistence is off
    pub fn storage_dir(&self) -> Option<PathBuf> {
        if self.no_persist {
            return None;
        }
        self.data_dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join("countdown-hub")))
    }
}
