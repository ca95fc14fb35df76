//! Application configuration module
//!
//! Configuration is read from environment variables with the
//! `PERSONA_INTERVIEW` prefix; nested values use `__` as separator.
//! Every section has defaults, so only the provider credential is
//! normally required.
//!
//! # Example
//!
//! ```no_run
//! use persona_interview::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Saving to {}", config.storage.data_dir.display());
//! ```

mod ai;
mod error;
mod interview;
mod logging;
mod storage;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use interview::InterviewConfig;
pub use logging::LoggingConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

use crate::application::interview::OrchestratorSettings;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "PERSONA_INTERVIEW";

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// AI provider configuration (Anthropic or an OpenAI-compatible endpoint)
    #[serde(default)]
    pub ai: AiConfig,

    /// Save location for interview state and the transcript
    #[serde(default)]
    pub storage: StorageConfig,

    /// Pacing and fallback text
    #[serde(default)]
    pub interview: InterviewConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `PERSONA_INTERVIEW__*` variables.
    ///
    /// - `PERSONA_INTERVIEW__AI__PROVIDER=openai_compatible` -> `ai.provider`
    /// - `PERSONA_INTERVIEW__STORAGE__DATA_DIR=./data` -> `storage.data_dir`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.storage.validate()?;
        self.interview.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Settings handed to the interview orchestrator.
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            pacing_delay: self.interview.pacing_delay(),
            fallback_message: self.interview.fallback_message.clone(),
            max_tokens: Some(self.ai.max_tokens),
            temperature: Some(self.ai.temperature),
        }
    }
}
