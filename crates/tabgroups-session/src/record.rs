//! Durable session record
//!
//! The serialized form of all groups across all windows. Tabs are persisted
//! as proxies (URL plus positional hint) because platform tab identifiers are
//! not stable across restarts. Group ids ARE stable and are persisted as-is.

use serde::{Deserialize, Serialize};

use tabgroups_groups::GroupStore;

/// Restart-stable stand-in for one member tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabProxy {
    pub url: String,
    /// Position within the window's tab strip at persist time; used as the
    /// tie-break when several open tabs share a URL.
    pub position_hint: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: String,
    pub name: String,
    /// Member proxies in membership order
    pub tabs: Vec<TabProxy>,
}

/// Groups of one window, in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub groups: Vec<GroupRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub windows: Vec<WindowRecord>,
}

impl SessionRecord {
    /// Snapshot the store's current group state. Includes groups whose window
    /// has already closed; their members resolve to no live tab and simply
    /// yield no proxies.
    pub fn capture(store: &GroupStore) -> Self {
        let windows = store
            .windows_with_groups()
            .into_iter()
            .map(|window| WindowRecord {
                groups: store
                    .groups_in_order(window)
                    .into_iter()
                    .map(|group| GroupRecord {
                        id: group.id.clone(),
                        name: group.name.clone(),
                        tabs: group
                            .tabs
                            .iter()
                            .filter_map(|tab_id| store.tab(*tab_id))
                            .map(|tab| TabProxy {
                                url: tab.url.clone(),
                                position_hint: tab.index,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self { windows }
    }

    pub fn is_empty(&self) -> bool {
        self.windows.iter().all(|w| w.groups.is_empty())
    }
}
