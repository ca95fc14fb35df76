//! OpenAI-compatible Provider - Implementation of AIProvider for any server
//! speaking the OpenAI chat completions protocol.
//!
//! The default base URL points at a local server (LM Studio and similar),
//! where no key is needed. Hosted endpoints take a bearer key.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAICompatibleConfig::new()
//!     .with_base_url("http://localhost:1234/v1")
//!     .with_model("local-model");
//!
//! let provider = OpenAICompatibleProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason,
    ProviderInfo, TokenUsage,
};

pub const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:1234/v1";

/// Configuration for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleConfig {
    /// Optional bearer key.
    api_key: Option<Secret<String>>,
    pub model: String,
    /// Base URL including the version segment (default: http://localhost:1234/v1).
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for OpenAICompatibleConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAICompatibleConfig {
    pub fn new() -> Self {
        Self {
            api_key: None,
            model: "local-model".to_string(),
            base_url: DEFAULT_LOCAL_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

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

/// Provider for OpenAI-style chat completion endpoints.
pub struct OpenAICompatibleProvider {
    config: OpenAICompatibleConfig,
    client: Client,
}

impl OpenAICompatibleProvider {
    /// # Errors
    ///
    /// Returns `AIError::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: OpenAICompatibleConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let messages = request
            .messages
            .iter()
            .map(|msg| OpenAIMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            })
            .collect();

        OpenAIRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    fn into_completion(response: OpenAIResponse) -> Result<CompletionResponse, AIError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("No choices in response"))?;

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AIError::parse("Response contained no text"))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        let usage = response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            usage,
            model: response.model.unwrap_or_default(),
            finish_reason,
        })
    }
}

#[async_trait]
impl AIProvider for OpenAICompatibleProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let body = self.to_openai_request(&request);
        let timeout_secs = self.config.timeout.as_secs() as u32;

        tracing::debug!(
            url = %self.completions_url(),
            model = %self.config.model,
            messages = body.messages.len(),
            "sending chat completion request"
        );

        let mut builder = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = self.config.api_key() {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AIError::from_transport(e, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AIError::from_status(status.as_u16(), error_body));
        }

        let parsed: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        Self::into_completion(parsed)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai_compatible", &self.config.model)
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: Option<String>,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
