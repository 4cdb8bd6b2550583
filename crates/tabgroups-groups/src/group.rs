//! Group data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tab::{TabId, WindowId};
use crate::UNNAMED_GROUP;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Stable identifier, survives restarts. Immutable once created.
    pub id: String,
    /// Window this group belongs to
    pub window: WindowId,
    /// Display name; never empty (placeholder substituted)
    pub name: String,
    /// Ordered member tab identifiers
    pub tabs: Vec<TabId>,
    /// When the group was created
    pub created_at: DateTime<Utc>,
    /// Last membership or name change
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(window: WindowId, name: Option<&str>) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            window,
            name: effective_name(name),
            tabs: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a group from its persisted form, keeping the stored id.
    pub fn rehydrated(id: String, window: WindowId, name: &str, tabs: Vec<TabId>) -> Self {
        let now = Utc::now();

        Self {
            id,
            window,
            name: effective_name(Some(name)),
            tabs,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: &str) {
        self.name = effective_name(Some(name));
        self.updated_at = Utc::now();
    }

    /// Append a member; keeps position if the tab is already a member.
    pub fn add_tab(&mut self, tab_id: TabId) {
        if !self.tabs.contains(&tab_id) {
            self.tabs.push(tab_id);
            self.updated_at = Utc::now();
        }
    }

    /// Remove a member. Returns true if it was present.
    pub fn remove_tab(&mut self, tab_id: TabId) -> bool {
        let before = self.tabs.len();
        self.tabs.retain(|id| *id != tab_id);
        if self.tabs.len() != before {
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}

/// Blank names collapse to the placeholder; a group is never nameless.
fn effective_name(name: Option<&str>) -> String {
    match name {
        Some(n) if !n.trim().is_empty() => n.to_string(),
        _ => UNNAMED_GROUP.to_string(),
    }
}

/// Query result with tab metadata resolved at call time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupWithTabs {
    pub id: String,
    pub name: String,
    pub tabs: Vec<TabView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabView {
    pub title: String,
    pub url: String,
}
