//! History of completed countdowns

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::StoreError;
use crate::{hub::CompletionHook, state::TimerState};

/// File name of the session log inside the data directory
pub const SESSIONS_FILE: &str = "sessions.jsonl";

/// One countdown that ran all the way to zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub total_time: u64,
    pub completed_at: DateTime<Utc>,
}

/// Completed sessions, kept in memory and appended to a JSON-lines file
#[derive(Debug)]
pub struct SessionHistory {
    path: Option<PathBuf>,
    sessions: Mutex<Vec<CompletedSession>>,
}

impl SessionHistory {
    /// Open the history at `path`, keeping whatever lines parse
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sessions = load_sessions(&path);
        Self {
            path: Some(path),
            sessions: Mutex::new(sessions),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Record a completed run of `total_time` seconds, appending it to the file
    pub fn record(&self, total_time: u64) -> Result<CompletedSession, StoreError> {
        let session = self.remember(total_time);
        if let Some(path) = &self.path {
            append_line(path, &session)?;
        }
        Ok(session)
    }

    fn remember(&self, total_time: u64) -> CompletedSession {
        let session = CompletedSession {
            total_time,
            completed_at: Utc::now(),
        };
        self.sessions().push(session.clone());
        session
    }

    pub fn list(&self) -> Vec<CompletedSession> {
        self.sessions().clone()
    }

    /// Sum of all completed session lengths in seconds
    pub fn total_seconds(&self) -> u64 {
        self.sessions().iter().map(|s| s.total_time).sum()
    }

    fn sessions(&self) -> MutexGuard<'_, Vec<CompletedSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CompletionHook for SessionHistory {
    fn name(&self) -> &str {
        "session-history"
    }

    fn on_complete(&self, state: &TimerState) {
        let session = self.remember(state.total_time);
        debug!("Recorded {}s session", session.total_time);
        let Some(path) = self.path.clone() else {
            return;
        };

        let append = move || {
            if let Err(e) = append_line(&path, &session) {
                warn!("Failed to persist completed session: {}", e);
            }
        };
        // Hooks run on the broadcast task; keep file I/O off the async workers
        match Handle::try_current() {
            Ok(runtime) => drop(runtime.spawn_blocking(append)),
            Err(_) => append(),
        }
    }
}

fn append_line(path: &Path, session: &CompletedSession) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let line = serde_json::to_string(session)?;
    let write_err = |source| StoreError::WriteFile {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    writeln!(file, "{}", line).map_err(write_err)
}

fn load_sessions(path: &Path) -> Vec<CompletedSession> {
    let Ok(data) = fs::read_to_string(path) else {
        return Vec::new();
    };

    data.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Skipping unreadable session record: {}", e);
                None
            }
        })
        .collect()
}
