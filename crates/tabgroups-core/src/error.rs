//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Group error: {0}")]
    Group(#[from] tabgroups_groups::GroupError),

    #[error("Session error: {0}")]
    Session(#[from] tabgroups_session::SessionError),

    #[error("Storage error: {0}")]
    Storage(#[from] tabgroups_storage::StorageError),
}
