//! File-backed record store.
//!
//! Layout under the namespace directory:
//!
//! ```text
//! <dir>/
//!   customers_index.json   ordered list of record keys
//!   <key>.json             one document per record
//! ```
//!
//! Writes go to a dot-prefixed temporary file that is renamed over the
//! target, so a crash mid-write leaves the previous document intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, instrument};

use super::{INDEX_KEY, Record, RecordStore, StoreError, check_key};

/// A [`RecordStore`] that keeps each document in its own JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await.map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        debug!("File store opened");
        Ok(Self { dir })
    }

    /// The namespace directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    async fn read_document<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let bytes = match fs::read(self.path_for(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    key: key.to_owned(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Json {
                key: key.to_owned(),
                source,
            })
    }

    async fn write_document<T: Serialize + Sync + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
            key: key.to_owned(),
            source,
        })?;
        let io_err = |source| StoreError::Io {
            key: key.to_owned(),
            source,
        };

        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, &bytes).await.map_err(io_err)?;
        if let Err(e) = fs::rename(&tmp, self.path_for(key)).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(io_err(e));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Record>, StoreError> {
        check_key(key)?;
        self.read_document(key).await
    }

    async fn put(&self, key: &str, record: &Record) -> Result<(), StoreError> {
        check_key(key)?;
        self.write_document(key, record).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        match fs::remove_file(self.path_for(key)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(StoreError::Io {
                key: key.to_owned(),
                source: e,
            }),
            _ => Ok(()),
        }
    }

    async fn read_index(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_document(INDEX_KEY).await?.unwrap_or_default())
    }

    async fn write_index(&self, keys: &[String]) -> Result<(), StoreError> {
        self.write_document(INDEX_KEY, keys).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_open_creates_nested_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("rubicoCustomerDB").join("customers");

        let store = FileStore::open(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();

        let store = FileStore::open(tmp.path()).await.unwrap();
        store.put("abc", &json!({"fullName": "Jo"})).await.unwrap();
        store.write_index(&["abc".to_string()]).await.unwrap();
        drop(store);

        let store = FileStore::open(tmp.path()).await.unwrap();
        assert_eq!(
            store.get("abc").await.unwrap(),
            Some(json!({"fullName": "Jo"}))
        );
        assert_eq!(store.read_index().await.unwrap(), vec!["abc".to_string()]);
        assert!(tmp.path().join("customers_index.json").is_file());
        assert!(!tmp.path().join(".abc.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_documents() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();

        assert_eq!(store.get("nope").await.unwrap(), None);
        assert!(store.read_index().await.unwrap().is_empty());
        store.remove("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();
        std::fs::write(tmp.path().join("bad.json"), b"{not json").unwrap();

        assert!(matches!(
            store.get("bad").await,
            Err(StoreError::Json { key, .. }) if key == "bad"
        ));
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_no_temp_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();
        // A non-empty directory where the document belongs cannot be replaced.
        std::fs::create_dir(tmp.path().join("abc.json")).unwrap();
        std::fs::write(tmp.path().join("abc.json").join("keep"), b"").unwrap();

        assert!(matches!(
            store.put("abc", &json!({ "id": "abc" })).await,
            Err(StoreError::Io { key, .. }) if key == "abc"
        ));
        assert!(!tmp.path().join(".abc.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();

        assert!(matches!(
            store.put("../escape", &json!({})).await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
