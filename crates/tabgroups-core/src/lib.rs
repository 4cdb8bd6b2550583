//! TabGroups Core
//!
//! Public façade for the tab-grouping and session-persistence subsystem.
//! The UI layer (panel, button, hotkey) only needs three things from here:
//! `groups_with_tabs` for rendering, `on_change` for re-render triggers, and
//! the mutation calls. Everything is an explicit context object; there are
//! no globals.

mod config;
mod error;
mod events;
mod manager;

pub use config::Config;
pub use error::CoreError;
pub use events::HostEvent;
pub use manager::TabManager;

// Re-export the pieces UI collaborators and the host glue work with
pub use tabgroups_groups::{
    Group, GroupError, GroupStore, GroupWithTabs, Tab, TabId, TabView, WindowId, UNNAMED_GROUP,
};
pub use tabgroups_session::{PersistenceAdapter, SessionError, SessionRecord};
pub use tabgroups_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
