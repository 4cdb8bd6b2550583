//! Tab Manager
//!
//! Coordinates the in-memory group store with debounced session persistence.
//! Constructed once at extension activation and passed to collaborators; all
//! mutations flow through here, in the order their triggering events arrive.
//! Reads always serve from memory; storage is only touched at startup and by
//! the background writer.

use std::sync::Arc;

use parking_lot::RwLock;

use tabgroups_groups::{Group, GroupStore, GroupWithTabs, Tab, TabId, WindowId};
use tabgroups_session::{reconcile, DebouncedWriter, PersistenceAdapter, SessionRecord};
use tabgroups_storage::Database;

use crate::config::Config;
use crate::events::HostEvent;
use crate::Result;

type ChangeListener = Arc<dyn Fn(WindowId) + Send + Sync>;

pub struct TabManager {
    store: Arc<RwLock<GroupStore>>,
    adapter: PersistenceAdapter,
    writer: DebouncedWriter,
    listeners: Arc<RwLock<Vec<ChangeListener>>>,
}

impl TabManager {
    /// Must be called within a tokio runtime: this spawns the writer task.
    pub fn new(db: Database, config: &Config) -> Self {
        let adapter = PersistenceAdapter::new(db);
        let writer = DebouncedWriter::spawn(adapter.clone(), config.save_quiet_window);

        Self {
            store: Arc::new(RwLock::new(GroupStore::new())),
            adapter,
            writer,
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Rehydrate persisted groups against the currently open tabs. Corrupt
    /// or missing state yields an empty store; startup never fails on
    /// persistence.
    pub fn initialize(&self, live_tabs: &[Tab]) {
        let record = self.adapter.load();
        let restored = reconcile(&record, live_tabs);

        let windows = restored.windows_with_groups().len();
        *self.store.write() = restored;

        tracing::info!(tab_count = live_tabs.len(), window_count = windows, "Initialized tab groups");
    }

    // --- read path -------------------------------------------------------

    /// Groups for one window with tab metadata resolved at call time. This
    /// is invoked on every panel display and never touches storage.
    pub fn groups_with_tabs(&self, window: WindowId) -> Vec<GroupWithTabs> {
        self.store.read().groups_with_tabs(window)
    }

    // --- mutations ---------------------------------------------------------

    pub fn create_group(&self, window: WindowId, name: Option<&str>) -> Result<Group> {
        let group = self.store.write().create_group(window, name)?;
        self.committed(window);
        Ok(group)
    }

    pub fn add_tab_to_group(&self, group_id: &str, tab_id: TabId) -> Result<()> {
        let window = self.store.write().add_tab_to_group(group_id, tab_id)?;
        self.committed(window);
        Ok(())
    }

    /// Ungroup a tab. No-op if it is not grouped.
    pub fn remove_tab(&self, tab_id: TabId) {
        // Bind first: an `if let` on the guard would hold the write lock
        // through the body and deadlock `committed`'s read
        let window = self.store.write().remove_tab(tab_id);
        if let Some(window) = window {
            self.committed(window);
        }
    }

    pub fn rename_group(&self, group_id: &str, name: &str) -> Result<()> {
        let window = self.store.write().rename_group(group_id, name)?;
        self.committed(window);
        Ok(())
    }

    pub fn delete_group(&self, group_id: &str) -> Result<()> {
        let window = self.store.write().delete_group(group_id)?;
        self.committed(window);
        Ok(())
    }

    // --- host lifecycle ------------------------------------------------

    pub fn handle_event(&self, event: HostEvent) {
        match event {
            HostEvent::WindowOpened { window } => {
                self.store.write().register_window(window);
            }
            // The window's groups stay in memory and in any already-pending
            // snapshot; no new snapshot is taken for a closing window, so a
            // restart restores its groups from the last good state.
            HostEvent::WindowClosed { window } => {
                self.store.write().unregister_window(window);
            }
            HostEvent::TabOpened { tab } => {
                self.store.write().upsert_tab(tab);
            }
            HostEvent::TabUpdated { tab } => {
                let grouped_in = {
                    let mut store = self.store.write();
                    let id = tab.id;
                    store.upsert_tab(tab);
                    store.group_of(id).map(|g| g.window)
                };
                // Panel content and persisted proxies changed
                if let Some(window) = grouped_in {
                    self.committed(window);
                }
            }
            HostEvent::TabClosed { id } => {
                let window = self.store.write().drop_tab(id);
                if let Some(window) = window {
                    self.committed(window);
                }
            }
            HostEvent::TabMoved { id, window, index } => {
                let source = self.store.write().move_tab(id, window, index);
                if let Some(source) = source {
                    self.committed(source);
                }
            }
        }
    }

    // --- notifications and teardown -------------------------------------

    /// Register a re-render callback. It receives only the affected window
    /// identifier, never a diff.
    pub fn on_change(&self, listener: impl Fn(WindowId) + Send + Sync + 'static) {
        self.listeners.write().push(Arc::new(listener));
    }

    /// Teardown: drop listeners, flush any pending session write, stop the
    /// writer task.
    pub async fn shutdown(&self) {
        self.listeners.write().clear();
        self.writer.shutdown().await;

        tracing::info!("Tab manager shut down");
    }

    /// Group state changed: schedule a debounced snapshot write and tell
    /// the UI which window to re-render.
    fn committed(&self, window: WindowId) {
        let record = SessionRecord::capture(&self.store.read());
        self.writer.schedule(record);

        // Snapshot the listener list so a callback may register further
        // listeners without deadlocking on the registry lock
        let listeners: Vec<ChangeListener> = self.listeners.read().iter().cloned().collect();
        for listener in listeners {
            listener(window);
        }
    }
}
