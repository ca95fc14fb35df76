//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the interview core to external systems:
//! - `ai` - Text-generation providers (Anthropic, OpenAI-compatible, mock)
//! - `storage` - Key-value stores (file, in-memory)

pub mod ai;
pub mod storage;

pub use ai::{
    AnthropicConfig, AnthropicProvider, MockAIProvider, OpenAICompatibleConfig,
    OpenAICompatibleProvider,
};
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore};
