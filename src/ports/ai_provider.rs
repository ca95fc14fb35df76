//! AI Provider Port - Interface for the text-generation service.
//!
//! The interview only needs single, non-streaming completions: an ordered
//! list of role-tagged messages goes out, one text payload comes back.
//! Every failure mode is an `AIError`; callers above the port are free to
//! treat them all as "generation failed".
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl AIProvider for EchoProvider {
//!     async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
//!         Ok(CompletionResponse::new("echo", "何でも話してください。"))
//!     }
//!
//!     fn provider_info(&self) -> ProviderInfo {
//!         ProviderInfo::new("echo", "echo")
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use crate::domain::interview::{Message, MessageRole};

/// Port for LLM completions.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Generate a single completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a completion.
///
/// The system prompt travels as a `System` message inside `messages`;
/// adapters whose API wants it elsewhere lift it out with
/// [`CompletionRequest::system_prompt`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Temperature for response randomness.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// All system message contents joined by blank lines, if any.
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.is_system())
            .map(|m| m.content.as_str())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    /// Non-system messages in order.
    pub fn dialogue(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.is_system())
    }
}

/// Response from a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Generated content.
    pub content: String,
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
    pub finish_reason: FinishReason,
}

impl CompletionResponse {
    /// A plain stop response with zero usage.
    pub fn new(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            model: model.into(),
            finish_reason: FinishReason::Stop,
        }
    }
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit max_tokens limit.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
}

/// Provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "anthropic", "openai_compatible").
    pub name: String,
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// AI provider errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AIError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider is unavailable (5xx).
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// No credential configured for a provider that needs one.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    /// The caller abandoned the request.
    #[error("request cancelled")]
    Cancelled,
}

impl AIError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// True when the failure comes from setup rather than the service,
    /// so retrying without changing configuration will not help.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AIError::MissingCredential(_) | AIError::AuthenticationFailed
        )
    }

    /// Maps a transport error from `reqwest` the same way for every adapter.
    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: u32) -> Self {
        if err.is_timeout() {
            AIError::Timeout { timeout_secs }
        } else if err.is_connect() {
            AIError::network(format!("Connection failed: {}", err))
        } else {
            AIError::network(err.to_string())
        }
    }

    /// Maps a non-success HTTP status to an error.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => AIError::AuthenticationFailed,
            429 => AIError::rate_limited(parse_retry_after(&body)),
            400 | 404 | 422 => AIError::InvalidRequest(body),
            500..=599 => AIError::unavailable(format!("Server error {}: {}", status, body)),
            _ => AIError::network(format!("Unexpected status {}: {}", status, body)),
        }
    }
}

/// Reads "try again in Ns" from a JSON error body, defaulting to 60s.
fn parse_retry_after(body: &str) -> u32 {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_owned)
        })
        .and_then(|msg| {
            let rest = &msg[msg.find("try again in ")? + "try again in ".len()..];
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        })
        .unwrap_or(60)
}
