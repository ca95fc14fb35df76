//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `AnthropicProvider` - Anthropic Messages API
//! - `OpenAICompatibleProvider` - OpenAI-style chat completions (local servers by default)
//! - `MockAIProvider` - Queued replies and errors for testing

mod anthropic_provider;
mod mock_provider;
mod openai_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider, INTERVIEW_KICKOFF};
pub use mock_provider::{MockAIProvider, DEFAULT_MOCK_REPLY};
pub use openai_provider::{OpenAICompatibleConfig, OpenAICompatibleProvider, DEFAULT_LOCAL_BASE_URL};
