//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the interview core and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Text-generation service that writes the interviewer's questions
//! - `KeyValueStore` - String store that keeps the interview across sessions

mod ai_provider;
mod key_value_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, TokenUsage,
};
pub use key_value_store::{validate_key, KeyValueStore, StoreError};
