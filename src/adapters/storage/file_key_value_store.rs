//! File-based Key-Value Store Adapter
//!
//! Stores each key as its own file under a data directory. Writes go to a
//! temporary file first and are renamed into place, so a crash mid-write
//! leaves the previous value intact.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{validate_key, KeyValueStore, StoreError};

/// File-based key-value store
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store rooted at `base_path`. The directory is created on
    /// first write.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileKeyValueStore::new("./data");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json.tmp", key))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;

        match fs::read_to_string(self.value_path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        fs::create_dir_all(&self.base_path).await?;

        let temp = self.temp_path(key);
        fs::write(&temp, value).await?;
        fs::rename(&temp, self.value_path(key)).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;

        match fs::remove_file(self.value_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
