//! Durable state: record types and the snapshot persistence adapter.

use std::sync::Arc;

pub mod models;
pub mod snapshot;

pub use models::{ShortCode, UrlRecord, User, UserId};
pub use snapshot::{FileSnapshotStore, NullSnapshotStore, SnapshotStore};

use crate::config::StorageConfig;

pub struct StorageFactory;

impl StorageFactory {
    /// Snapshot store for the URL registry.
    pub fn links(config: &StorageConfig) -> Arc<dyn SnapshotStore<UrlRecord>> {
        Arc::new(FileSnapshotStore::new(&config.links_file, "links"))
    }

    /// Snapshot store for users. Without `users_file` accounts live in memory only.
    pub fn users(config: &StorageConfig) -> Arc<dyn SnapshotStore<User>> {
        match config.users_file.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => Arc::new(FileSnapshotStore::new(path, "users")),
            None => Arc::new(NullSnapshotStore),
        }
    }
}
