//! In-memory record store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Record, RecordStore, StoreError, check_key};

/// A [`RecordStore`] that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: HashMap<String, Record>,
    index: Vec<String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, not counting the index.
    pub async fn record_count(&self) -> usize {
        self.inner.read().await.records.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Record>, StoreError> {
        check_key(key)?;
        Ok(self.inner.read().await.records.get(key).cloned())
    }

    async fn put(&self, key: &str, record: &Record) -> Result<(), StoreError> {
        check_key(key)?;
        self.inner
            .write()
            .await
            .records
            .insert(key.to_owned(), record.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.inner.write().await.records.remove(key);
        Ok(())
    }

    async fn read_index(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.inner.read().await.index.clone())
    }

    async fn write_index(&self, keys: &[String]) -> Result<(), StoreError> {
        self.inner.write().await.index = keys.to_vec();
        Ok(())
    }
}
