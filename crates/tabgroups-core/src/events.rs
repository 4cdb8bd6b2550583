//! Host lifecycle events
//!
//! The host browser delivers these on its single logical event loop;
//! `TabManager::handle_event` applies them in arrival order.

use tabgroups_groups::{Tab, TabId, WindowId};

#[derive(Debug, Clone)]
pub enum HostEvent {
    WindowOpened { window: WindowId },
    WindowClosed { window: WindowId },
    /// A tab opened; it starts out ungrouped.
    TabOpened { tab: Tab },
    /// Title or URL changed on an existing tab.
    TabUpdated { tab: Tab },
    TabClosed { id: TabId },
    /// A tab moved to another window; it arrives ungrouped there and the
    /// user must re-group it explicitly.
    TabMoved { id: TabId, window: WindowId, index: u32 },
}
