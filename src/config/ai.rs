//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Which provider writes the questions
    #[serde(default)]
    pub provider: AiProvider,

    /// Anthropic API key (required when `provider = anthropic`)
    pub anthropic_api_key: Option<String>,

    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,

    /// Optional bearer key for the OpenAI-compatible endpoint
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible base URL, including the version segment
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
pub enum AiProvider {
    #[default]
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "openai_compatible", alias = "local", alias = "openai")]
    OpenAICompatible,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if Anthropic is configured
    pub fn has_anthropic(&self) -> bool {
        self.anthropic_api_key
            .as_ref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.provider == AiProvider::Anthropic && !self.has_anthropic() {
            return Err(ValidationError::MissingRequired("ANTHROPIC_API_KEY"));
        }

        if self.provider == AiProvider::OpenAICompatible
            && !(self.openai_base_url.starts_with("http://")
                || self.openai_base_url.starts_with("https://"))
        {
            return Err(ValidationError::InvalidBaseUrl(self.openai_base_url.clone()));
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.max_tokens == 0 {
            return Err(ValidationError::InvalidMaxTokens);
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            anthropic_api_key: None,
            anthropic_model: default_anthropic_model(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            openai_model: default_openai_model(),
            timeout_secs: default_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_openai_base_url() -> String {
    "http://localhost:1234/v1".to_string()
}

fn default_openai_model() -> String {
    "local-model".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}
