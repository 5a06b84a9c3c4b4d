//! Key-value record storage.
//!
//! A store maps keys to JSON documents and keeps one extra document, the
//! index, holding an ordered list of record keys. The store knows nothing
//! about customers; the repository decides what goes in the index and in
//! which order.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local, used by tests and `RUBICO_STORE_BACKEND=memory`
//! - [`FileStore`] - one JSON file per key under a namespace directory
//!
//! # Keys
//!
//! Keys are restricted to ASCII alphanumerics, `-` and `_` so they are safe
//! to use as file names. [`INDEX_KEY`] is reserved for the index.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// A stored document.
pub type Record = serde_json::Value;

/// Key under which the index is persisted.
pub const INDEX_KEY: &str = "customers_index";

/// Errors raised by a [`RecordStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage failed (missing permissions, disk full, ...).
    #[error("storage I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A document could not be encoded or decoded as JSON.
    #[error("invalid JSON document {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The key is empty, reserved, or contains unsupported characters.
    #[error("invalid record key {0:?}")]
    InvalidKey(String),
}

/// Durable key-value storage with an ordered index of record keys.
///
/// Implementations do no locking across calls. Callers that read, modify and
/// write the index must serialize those sequences themselves.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a record, or `None` if the key is not present.
    async fn get(&self, key: &str) -> Result<Option<Record>, StoreError>;

    /// Insert or overwrite a record.
    async fn put(&self, key: &str, record: &Record) -> Result<(), StoreError>;

    /// Delete a record. Deleting a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Read the index. A store that never wrote one returns an empty list.
    async fn read_index(&self) -> Result<Vec<String>, StoreError>;

    /// Replace the index wholesale.
    async fn write_index(&self, keys: &[String]) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<Record>, StoreError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, record: &Record) -> Result<(), StoreError> {
        (**self).put(key, record).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key).await
    }

    async fn read_index(&self) -> Result<Vec<String>, StoreError> {
        (**self).read_index().await
    }

    async fn write_index(&self, keys: &[String]) -> Result<(), StoreError> {
        (**self).write_index(keys).await
    }
}

/// Reject keys that are empty, reserved, or not file-name safe.
pub(crate) fn check_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key != INDEX_KEY
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_owned()))
    }
}
