//! Interview persistence on top of a `KeyValueStore`.
//!
//! Three keys are used: the serialized `InterviewState`, the serialized
//! list of `ConversationTurn`s and a completion flag. Values are JSON.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::interview::{ConversationTurn, InterviewState};
use crate::ports::{KeyValueStore, StoreError};

pub const STATE_KEY: &str = "interview_state";
pub const TURNS_KEY: &str = "conversation_history";
pub const COMPLETED_KEY: &str = "interview_completed";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A previously saved interview.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredInterview {
    pub state: InterviewState,
    pub turns: Vec<ConversationTurn>,
}

#[derive(Clone)]
pub struct InterviewRepository {
    store: Arc<dyn KeyValueStore>,
}

impl InterviewRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads the saved interview.
    ///
    /// Returns `None` unless both the state and the turn list exist and
    /// parse. Read and parse failures are logged and treated as absent.
    pub async fn load(&self) -> Option<StoredInterview> {
        let state_json = self.read(STATE_KEY).await?;
        let turns_json = self.read(TURNS_KEY).await?;

        let state = match serde_json::from_str::<InterviewState>(&state_json) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(key = STATE_KEY, error = %e, "stored interview state is unreadable");
                return None;
            }
        };
        let turns = match serde_json::from_str::<Vec<ConversationTurn>>(&turns_json) {
            Ok(turns) => turns,
            Err(e) => {
                tracing::warn!(key = TURNS_KEY, error = %e, "stored turn list is unreadable");
                return None;
            }
        };

        Some(StoredInterview { state, turns })
    }

    /// Writes the state and the turn list. The two writes are not atomic.
    pub async fn save(
        &self,
        state: &InterviewState,
        turns: &[ConversationTurn],
    ) -> Result<(), RepositoryError> {
        let state_json = serde_json::to_string(state)?;
        let turns_json = serde_json::to_string(turns)?;

        self.store.set(STATE_KEY, &state_json).await?;
        self.store.set(TURNS_KEY, &turns_json).await?;
        Ok(())
    }

    pub async fn mark_completed(&self) -> Result<(), RepositoryError> {
        self.store.set(COMPLETED_KEY, "true").await?;
        Ok(())
    }

    pub async fn is_completed(&self) -> bool {
        matches!(self.read(COMPLETED_KEY).await.as_deref(), Some("true"))
    }

    /// Removes all three keys.
    pub async fn clear(&self) -> Result<(), RepositoryError> {
        for key in [STATE_KEY, TURNS_KEY, COMPLETED_KEY] {
            self.store.remove(key).await?;
        }
        Ok(())
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read from store");
                None
            }
        }
    }
}
