//! Interview pacing and presentation configuration

use serde::Deserialize;
use std::time::Duration;

use crate::application::interview::DEFAULT_FALLBACK_MESSAGE;

use super::error::ValidationError;

const MAX_PACING_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Deserialize)]
pub struct InterviewConfig {
    /// Pause between a committed answer and the next question, in milliseconds
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    /// Text shown in place of a question when generation fails
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

impl InterviewConfig {
    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pacing_delay_ms > MAX_PACING_DELAY_MS {
            return Err(ValidationError::PacingDelayTooLong);
        }
        if self.fallback_message.trim().is_empty() {
            return Err(ValidationError::EmptyFallbackMessage);
        }
        Ok(())
    }
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            pacing_delay_ms: default_pacing_delay_ms(),
            fallback_message: default_fallback_message(),
        }
    }
}

fn default_pacing_delay_ms() -> u64 {
    500
}

fn default_fallback_message() -> String {
    DEFAULT_FALLBACK_MESSAGE.to_string()
}
