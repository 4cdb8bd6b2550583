//! Live tab and window handles
//!
//! Tabs are owned by the host browser; the store only mirrors the metadata it
//! needs to answer panel queries. Both identifiers are platform-assigned and
//! NOT stable across browser restarts.

use serde::{Deserialize, Serialize};

/// Opaque platform identifier for a browser window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// Opaque platform identifier for a browser tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// Snapshot of a live tab, fed in through host lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    /// Platform identifier (unstable across restarts)
    pub id: TabId,
    /// Window this tab currently lives in
    pub window: WindowId,
    /// Page title
    pub title: String,
    /// Current URL
    pub url: String,
    /// Position within the window's tab strip
    pub index: u32,
}

impl Tab {
    pub fn new(id: TabId, window: WindowId, title: impl Into<String>, url: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            window,
            title: title.into(),
            url: url.into(),
            index,
        }
    }
}
