//! Error types for tubefetch

use std::time::Duration;
use thiserror::Error;

use crate::core::OutputFormat;

/// Main error type for search and download operations
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailure(String),

    #[error("Downloaded file not found in {format} format")]
    ArtifactMissing { format: OutputFormat },

    #[error("IO error: {0}")]
    ResourceError(#[from] std::io::Error),

    #[error("Extractor binary not found: {0}")]
    ExtractorNotFound(String),

    #[error("Extraction timed out after {}", pretty_duration(.0))]
    Timeout(Duration),
}

fn pretty_duration(duration: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*duration)
}

impl FetchError {
    /// Check if the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, FetchError::InvalidInput(_))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::ExtractionFailure(format!("malformed extractor response: {}", err))
    }
}
