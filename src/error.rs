//! Error types for ingestion, configuration and export.
//!
//! Data-quality problems in individual rows are never errors; they are
//! counted in [`crate::normalize::DataQualityReport`]. Only problems that
//! prevent a complete result from being produced end up here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing required columns or an empty table.
    #[error("Invalid input '{source_name}': {message}")]
    InputShape {
        source_name: String,
        message: String,
    },
}

impl AnalysisError {
    pub fn input_shape(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputShape {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
