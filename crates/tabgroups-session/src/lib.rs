//! TabGroups Session Persistence
//!
//! Translates the live, identifier-based group model into a restart-durable
//! `SessionRecord` and back. Platform tab ids do not survive a browser
//! restart, so persisted membership is keyed by URL plus a position hint and
//! reconciled against the live tab set at startup. Writes are debounced.

mod adapter;
mod error;
mod record;
mod writer;

pub use adapter::{reconcile, PersistenceAdapter};
pub use error::SessionError;
pub use record::{GroupRecord, SessionRecord, TabProxy, WindowRecord};
pub use writer::DebouncedWriter;

pub type Result<T> = std::result::Result<T, SessionError>;
