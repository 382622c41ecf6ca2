//! Persistent key-value storage subsystem.
//!
//! # Data Flow
//! ```text
//! TokenStore / LanguageResolver
//!     → Storage trait (get/set/remove by fixed string key)
//!     → memory.rs (process-local map)
//!     → file.rs (JSON file, survives restarts)
//! ```
//!
//! Storage never reports errors to callers. A backend that cannot read or
//! write logs the failure and behaves as if the key were absent.

pub mod file;
pub mod memory;

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Key-value storage addressed by fixed string keys.
pub trait Storage: Send + Sync {
    /// Read a value; `None` when absent or unavailable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, overwriting any previous one.
    fn set(&self, key: &str, value: &str);

    /// Remove a value. Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}

/// Build the storage backend selected by configuration.
pub fn from_config(config: &StorageConfig) -> Arc<dyn Storage> {
    match (config.backend, config.path.as_deref()) {
        (StorageBackend::File, Some(path)) => Arc::new(FileStorage::open(path)),
        (StorageBackend::File, None) => {
            tracing::warn!("File storage selected without a path; falling back to memory");
            Arc::new(MemoryStorage::new())
        }
        (StorageBackend::Memory, _) => Arc::new(MemoryStorage::new()),
    }
}
