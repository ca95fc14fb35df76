//! In-Memory Key-Value Store Adapter
//!
//! Keeps values in a shared map. Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{validate_key, KeyValueStore, StoreError};

/// In-memory key-value store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.values.write().await.clear();
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = InMemoryKeyValueStore::new();

        store.set("interview_state", "{}").await.unwrap();
        assert_eq!(store.get("interview_state").await.unwrap().as_deref(), Some("{}"));
        assert_eq!(store.len().await, 1);

        store.remove("interview_state").await.unwrap();
        assert_eq!(store.get("interview_state").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_values() {
        let store = InMemoryKeyValueStore::new();
        let other = store.clone();

        other.set("k", "v").await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = InMemoryKeyValueStore::new();
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();

        store.clear().await;

        assert!(store.is_empty().await);
    }
}
