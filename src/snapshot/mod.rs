//! Versioned snapshots of classified questions.
//!
//! A [`Snapshot`] is built once by [`DatabaseBuilder`], persisted through a
//! [`SnapshotStore`] and never mutated afterwards. A new build produces a new
//! snapshot that replaces the old one wholesale.

mod backends;
mod builder;
mod bundled;
mod export;
mod model;
#[cfg(feature = "sqlite")]
mod sqlite;
mod store;

pub use backends::{open_backend, FileBackend, MemoryBackend, StorageBackend};
pub use builder::DatabaseBuilder;
pub use bundled::bundled_snapshot;
pub use export::{export_snapshot, import_snapshot};
pub use model::{Provenance, QuestionItem, Snapshot};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
pub use store::{SnapshotStore, DEFAULT_KEY};
