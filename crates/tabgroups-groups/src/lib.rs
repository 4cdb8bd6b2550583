//! TabGroups Group Bookkeeping
//!
//! Pure in-memory state: live tabs mirrored from the host, named groups per
//! browser window, and the exclusivity rule that a tab belongs to at most one
//! group within its window. No I/O happens here.

mod error;
mod group;
mod store;
mod tab;

pub use error::GroupError;
pub use group::{Group, GroupWithTabs, TabView};
pub use store::GroupStore;
pub use tab::{Tab, TabId, WindowId};

pub type Result<T> = std::result::Result<T, GroupError>;

/// Display name given to groups created or rehydrated without one.
pub const UNNAMED_GROUP: &str = "Unnamed group";
