//! Group Store
//!
//! Authoritative in-memory mapping between live tabs and logical groups,
//! windowed by browser-window identity. All mutations are single-step
//! structural updates: a failed call leaves the store untouched.

use std::collections::{HashMap, HashSet};

use crate::error::GroupError;
use crate::group::{Group, GroupWithTabs, TabView};
use crate::tab::{Tab, TabId, WindowId};
use crate::Result;

#[derive(Debug, Default)]
pub struct GroupStore {
    /// Windows currently open, per host events
    windows: HashSet<WindowId>,
    /// Live tab snapshots keyed by platform id
    tabs: HashMap<TabId, Tab>,
    /// Groups keyed by their stable id
    groups: HashMap<String, Group>,
    /// Creation order of group ids, per window
    order: HashMap<WindowId, Vec<String>>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- window and tab mirroring -------------------------------------

    pub fn register_window(&mut self, window: WindowId) {
        if self.windows.insert(window) {
            tracing::debug!(%window, "Registered window");
        }
    }

    /// Window closed: its live tabs vanish (each ungrouped first), but the
    /// window's groups are kept so a pending snapshot still carries them.
    pub fn unregister_window(&mut self, window: WindowId) {
        self.windows.remove(&window);

        let closed: Vec<TabId> = self
            .tabs
            .values()
            .filter(|t| t.window == window)
            .map(|t| t.id)
            .collect();
        for tab_id in closed {
            self.drop_tab(tab_id);
        }

        tracing::debug!(%window, "Unregistered window");
    }

    pub fn is_window_known(&self, window: WindowId) -> bool {
        self.windows.contains(&window)
    }

    /// Mirror a live tab (opened, or title/url update). Registers its window.
    pub fn upsert_tab(&mut self, tab: Tab) {
        self.windows.insert(tab.window);
        self.tabs.insert(tab.id, tab);
    }

    pub fn tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.tabs.get(&tab_id)
    }

    // --- group mutations -----------------------------------------------

    pub fn create_group(&mut self, window: WindowId, name: Option<&str>) -> Result<Group> {
        if !self.windows.contains(&window) {
            return Err(GroupError::InvalidWindow(window));
        }

        let group = Group::new(window, name);
        self.order.entry(window).or_default().push(group.id.clone());
        self.groups.insert(group.id.clone(), group.clone());

        tracing::info!(group_id = %group.id, %window, name = %group.name, "Created group");

        Ok(group)
    }

    /// Add a live tab to a group, removing it from any other group in the
    /// same window first. Re-adding to the same group keeps its position.
    pub fn add_tab_to_group(&mut self, group_id: &str, tab_id: TabId) -> Result<WindowId> {
        let window = self
            .groups
            .get(group_id)
            .map(|g| g.window)
            .ok_or_else(|| GroupError::GroupNotFound(group_id.to_string()))?;

        let tab_window = self
            .tabs
            .get(&tab_id)
            .map(|t| t.window)
            .ok_or(GroupError::TabNotFound(tab_id))?;

        if tab_window != window {
            return Err(GroupError::InvalidWindow(tab_window));
        }

        // Exclusivity: at most one group per window holds this tab
        let siblings: Vec<String> = self
            .order
            .get(&window)
            .map(|ids| ids.iter().filter(|id| id.as_str() != group_id).cloned().collect())
            .unwrap_or_default();
        for sibling in siblings {
            if let Some(group) = self.groups.get_mut(&sibling) {
                group.remove_tab(tab_id);
            }
        }

        if let Some(group) = self.groups.get_mut(group_id) {
            group.add_tab(tab_id);
        }

        tracing::debug!(%group_id, %tab_id, %window, "Added tab to group");

        Ok(window)
    }

    /// Ungroup a tab wherever it is held. `None` if it was not grouped.
    pub fn remove_tab(&mut self, tab_id: TabId) -> Option<WindowId> {
        let holder = self
            .groups
            .values()
            .find(|g| g.tabs.contains(&tab_id))
            .map(|g| g.id.clone());

        let group_id = holder?;
        let group = self.groups.get_mut(&group_id)?;
        group.remove_tab(tab_id);
        let window = group.window;

        tracing::debug!(%group_id, %tab_id, %window, "Removed tab from group");

        Some(window)
    }

    /// Tab closed: ungroup and forget its snapshot. The holding group is
    /// retained even if this was its last member.
    pub fn drop_tab(&mut self, tab_id: TabId) -> Option<WindowId> {
        let window = self.remove_tab(tab_id);
        self.tabs.remove(&tab_id);
        window
    }

    /// Tab moved between windows: it leaves its group in the source window
    /// and arrives ungrouped in the destination. Returns the source window
    /// if group membership changed there.
    pub fn move_tab(&mut self, tab_id: TabId, window: WindowId, index: u32) -> Option<WindowId> {
        let source = self.remove_tab(tab_id);

        if let Some(tab) = self.tabs.get_mut(&tab_id) {
            tab.window = window;
            tab.index = index;
            self.windows.insert(window);
        }

        source
    }

    pub fn rename_group(&mut self, group_id: &str, name: &str) -> Result<WindowId> {
        let group = self
            .groups
            .get_mut(group_id)
            .ok_or_else(|| GroupError::GroupNotFound(group_id.to_string()))?;

        group.rename(name);

        tracing::info!(%group_id, name = %group.name, "Renamed group");

        Ok(group.window)
    }

    /// Delete a group. Its members become untracked (the tabs themselves are
    /// owned by the host and are not touched). The id is terminal.
    pub fn delete_group(&mut self, group_id: &str) -> Result<WindowId> {
        let group = self
            .groups
            .remove(group_id)
            .ok_or_else(|| GroupError::GroupNotFound(group_id.to_string()))?;

        if let Some(ids) = self.order.get_mut(&group.window) {
            ids.retain(|id| id != group_id);
        }

        tracing::info!(%group_id, window = %group.window, "Deleted group");

        Ok(group.window)
    }

    /// Rebuild a group from persisted state, keeping its stable id. Members
    /// that are not live tabs of the target window are skipped.
    pub fn restore_group(
        &mut self,
        window: WindowId,
        id: String,
        name: &str,
        members: Vec<TabId>,
    ) -> Result<()> {
        if !self.windows.contains(&window) {
            return Err(GroupError::InvalidWindow(window));
        }

        let members: Vec<TabId> = members
            .into_iter()
            .filter(|tab_id| {
                self.tabs
                    .get(tab_id)
                    .map(|t| t.window == window)
                    .unwrap_or(false)
            })
            .collect();

        // Exclusivity holds across rehydration too
        for tab_id in &members {
            self.remove_tab(*tab_id);
        }

        let group = Group::rehydrated(id, window, name, members);
        self.order.entry(window).or_default().push(group.id.clone());

        tracing::debug!(group_id = %group.id, %window, tab_count = group.tab_count(), "Restored group");

        self.groups.insert(group.id.clone(), group);

        Ok(())
    }

    // --- queries --------------------------------------------------------

    /// Groups for one window in creation order, with tab metadata resolved
    /// at call time. Empty groups are included.
    pub fn groups_with_tabs(&self, window: WindowId) -> Vec<GroupWithTabs> {
        let Some(ids) = self.order.get(&window) else {
            return Vec::new();
        };

        ids.iter()
            .filter_map(|id| self.groups.get(id))
            .map(|group| GroupWithTabs {
                id: group.id.clone(),
                name: group.name.clone(),
                tabs: group
                    .tabs
                    .iter()
                    .filter_map(|tab_id| self.tabs.get(tab_id))
                    .map(|tab| TabView {
                        title: tab.title.clone(),
                        url: tab.url.clone(),
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.get(group_id)
    }

    /// The group currently holding a tab, if any.
    pub fn group_of(&self, tab_id: TabId) -> Option<&Group> {
        self.groups.values().find(|g| g.tabs.contains(&tab_id))
    }

    /// Windows that have groups recorded, in stable order. Includes windows
    /// that have since closed but whose groups are still held.
    pub fn windows_with_groups(&self) -> Vec<WindowId> {
        let mut windows: Vec<WindowId> = self
            .order
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(w, _)| *w)
            .collect();
        windows.sort();
        windows
    }

    /// Groups for one window in creation order.
    pub fn groups_in_order(&self, window: WindowId) -> Vec<&Group> {
        self.order
            .get(&window)
            .map(|ids| ids.iter().filter_map(|id| self.groups.get(id)).collect())
            .unwrap_or_default()
    }
}
