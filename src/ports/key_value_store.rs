//! Key-Value Store Port - Interface for persisting interview data.
//!
//! String keys, string values, best-effort durability. No atomic
//! multi-key guarantee is assumed by callers.

use async_trait::async_trait;

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),
}

/// Port for a string-keyed, string-valued store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    ///
    /// # Returns
    /// `None` if the key has never been set or was removed
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Keys must be non-empty and made of ASCII letters, digits, `_`, `-` or `.`,
/// and must not start with a dot.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
