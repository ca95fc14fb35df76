//! Storage configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::ValidationError;

/// Where the interview is saved
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one file per stored key
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File name of the Markdown transcript written on completion
    #[serde(default = "default_transcript_file")]
    pub transcript_file: String,
}

impl StorageConfig {
    pub fn transcript_path(&self) -> PathBuf {
        self.data_dir.join(&self.transcript_file)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyDataDir);
        }
        if self.transcript_file.trim().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__TRANSCRIPT_FILE"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            transcript_file: default_transcript_file(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    Path::new("data").to_path_buf()
}

fn default_transcript_file() -> String {
    "interview_transcript.md".to_string()
}
