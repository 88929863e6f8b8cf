//! Snapshot persistence
//!
//! The whole application state is stored as a single JSON blob under one
//! namespaced key. The storage medium sits behind [`KeyValueStore`].

pub mod snapshot;
pub mod store;

pub use snapshot::{Snapshot, SnapshotAdapter};
pub use store::{FileStore, KeyValueStore, MemoryStore};

use thiserror::Error;

/// Key the snapshot is stored under
pub const SNAPSHOT_KEY: &str = "arise_app_data_v1";

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The stored blob is not a valid snapshot
    #[error("snapshot could not be decoded: {0}")]
    Deserialization(String),

    #[error("snapshot could not be encoded: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("storage backend unavailable: {0}")]
    Backend(String),
}
