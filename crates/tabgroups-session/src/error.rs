//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] tabgroups_storage::StorageError),

    #[error("Corrupt session record: {0}")]
    CorruptRecord(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
