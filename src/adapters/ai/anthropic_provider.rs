//! Anthropic Provider - Implementation of AIProvider for Anthropic's Messages API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AnthropicConfig::new()
//!     .with_api_key(api_key)
//!     .with_model("claude-sonnet-4-20250514");
//!
//! let provider = AnthropicProvider::new(config)?;
//! ```
//!
//! The Messages API takes the system prompt as a top-level field and
//! requires the dialogue to open with a user turn. Interview history opens
//! with the interviewer's question, so a short kickoff line is prepended.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

const DEFAULT_MAX_TOKENS: u32 = 4096;

/// User turn sent ahead of the history so the dialogue opens with `user`.
pub const INTERVIEW_KICKOFF: &str = "インタビューを始めてください。";

/// Configuration for the Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    api_key: Option<Secret<String>>,
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,
    /// Base URL for the API (default: https://api.anthropic.com).
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AnthropicConfig {
    /// Creates a configuration without a key.
    pub fn new() -> Self {
        Self {
            api_key: None,
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    /// Uses an already-wrapped key, or none.
    pub fn with_secret_key(mut self, api_key: Option<Secret<String>>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Anthropic API provider implementation.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// # Errors
    ///
    /// Returns `AIError::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: AnthropicConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    fn to_anthropic_request(&self, request: &CompletionRequest) -> AnthropicRequest {
        let mut messages: Vec<AnthropicMessage> = request
            .dialogue()
            .map(|msg| AnthropicMessage {
                role: match msg.role {
                    MessageRole::Assistant => "assistant",
                    _ => "user",
                }
                .to_string(),
                content: msg.content.clone(),
            })
            .collect();

        if messages.first().map_or(true, |m| m.role != "user") {
            messages.insert(
                0,
                AnthropicMessage {
                    role: "user".to_string(),
                    content: INTERVIEW_KICKOFF.to_string(),
                },
            );
        }

        AnthropicRequest {
            model: self.config.model.clone(),
            messages,
            system: request.system_prompt(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
        }
    }

    fn into_completion(response: AnthropicResponse) -> Result<CompletionResponse, AIError> {
        let content = response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if content.trim().is_empty() {
            return Err(AIError::parse("Response contained no text"));
        }

        let finish_reason = match response.stop_reason.as_deref() {
            Some("max_tokens") => FinishReason::Length,
            _ => FinishReason::Stop,
        };

        Ok(CompletionResponse {
            content,
            usage: TokenUsage::new(response.usage.input_tokens, response.usage.output_tokens),
            model: response.model,
            finish_reason,
        })
    }
}

#[async_trait]
impl AIProvider for AnthropicProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| AIError::MissingCredential("ANTHROPIC_API_KEY".to_string()))?;

        let body = self.to_anthropic_request(&request);
        let timeout_secs = self.config.timeout.as_secs() as u32;

        tracing::debug!(
            model = %self.config.model,
            messages = body.messages.len(),
            "sending Anthropic completion request"
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AIError::from_transport(e, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AIError::from_status(status.as_u16(), error_body));
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        Self::into_completion(parsed)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("anthropic", &self.config.model)
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::Message;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new(AnthropicConfig::new().with_api_key("test-key")).unwrap()
    }

    #[test]
    fn config_builder_works() {
        let config = AnthropicConfig::new()
            .with_api_key("test-key")
            .with_model("claude-3-haiku-20240307")
            .with_base_url("https://custom.api.com")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.model, "claude-3-haiku-20240307");
        assert_eq!(config.base_url, "https://custom.api.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.api_key(), Some("test-key"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        assert_eq!(AnthropicConfig::new().with_api_key("  ").api_key(), None);
    }

    #[test]
    fn system_prompt_is_lifted_and_kickoff_prepended() {
        let request = CompletionRequest::new(vec![
            Message::system("persona"),
            Message::assistant("最初の質問"),
            Message::user("回答"),
        ])
        .with_temperature(0.7);

        let body = provider().to_anthropic_request(&request);

        assert_eq!(body.system.as_deref(), Some("persona"));
        assert_eq!(body.max_tokens, DEFAULT_MAX_TOKENS);
        let roles: Vec<&str> = body.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);
        assert_eq!(body.messages[0].content, INTERVIEW_KICKOFF);
    }

    #[test]
    fn first_turn_sends_only_kickoff() {
        let request = CompletionRequest::new(vec![Message::system("persona")]);
        let body = provider().to_anthropic_request(&request);

        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
    }

    #[test]
    fn text_blocks_are_joined() {
        let json = r#"{
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "text", "text": "その時、"},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "何を感じましたか？"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 120, "output_tokens": 30}
        }"#;
        let parsed: AnthropicResponse = serde_json::from_str(json).unwrap();

        let completion = AnthropicProvider::into_completion(parsed).unwrap();

        assert_eq!(completion.content, "その時、何を感じましたか？");
        assert_eq!(completion.usage.total_tokens, 150);
        assert_eq!(completion.finish_reason, FinishReason::Stop);
    }

    #[test]
    fn empty_reply_is_a_parse_error() {
        let json = r#"{"model":"m","content":[],"stop_reason":"end_turn","usage":{"input_tokens":1,"output_tokens":0}}"#;
        let parsed: AnthropicResponse = serde_json::from_str(json).unwrap();

        assert!(matches!(
            AnthropicProvider::into_completion(parsed),
            Err(AIError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let provider = AnthropicProvider::new(AnthropicConfig::new()).unwrap();
        let request = CompletionRequest::new(vec![Message::system("persona")]);

        let err = provider.complete(request).await.unwrap_err();

        assert!(matches!(err, AIError::MissingCredential(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn provider_info_reports_model() {
        let info = provider().provider_info();
        assert_eq!(info.name, "anthropic");
        assert_eq!(info.model, "claude-sonnet-4-20250514");
    }
}
