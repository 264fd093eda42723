//! Recovery error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("Storage error: {0}")]
    Storage(#[from] kestrel_storage::StorageError),

    #[error("Snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Failed to capture session state: {0}")]
    Capture(String),

    #[error("Recovery worker stopped")]
    WorkerStopped,
}
