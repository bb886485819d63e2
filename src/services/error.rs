//! Error types for the on-disk stores

use std::path::PathBuf;
use thiserror::Error;

/// Errors while persisting presets or session history
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize store contents")]
    Serialize(#[from] serde_json::Error),

    #[error("no preset at index {index} (have {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
