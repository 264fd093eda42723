//! Kestrel Storage Layer
//!
//! Two stores live here:
//! - a SQLite settings database for small persisted preferences
//! - a byte-oriented snapshot file used by crash recovery

mod database;
mod error;
mod migrations;
mod snapshot;

pub use database::Database;
pub use error::StorageError;
pub use snapshot::{ReadOutcome, SnapshotFile, SnapshotStore, STATE_FILE};

pub type Result<T> = std::result::Result<T, StorageError>;
