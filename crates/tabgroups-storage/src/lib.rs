//! TabGroups Storage Layer
//!
//! SQLite-based durable key-value storage scoped to the extension.
//! All writes are transactional; readers never observe a torn payload.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
