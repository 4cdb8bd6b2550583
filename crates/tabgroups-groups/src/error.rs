//! Group error types

use thiserror::Error;

use crate::tab::{TabId, WindowId};

#[derive(Error, Debug)]
pub enum GroupError {
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Unknown window: {0}")]
    InvalidWindow(WindowId),

    #[error("Tab not tracked: {0}")]
    TabNotFound(TabId),
}
