//! Error types for source extraction

use thiserror::Error;

/// Errors that can occur while extracting source material
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Network failure talking to an extraction service
    #[error("Communication error: {0}")]
    Communication(String),

    /// The service answered with a non-2xx status
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// The URL could not be parsed
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    /// The video has no captions in the requested language
    #[error("No transcript available for video {0}")]
    NoTranscript(String),

    /// The page yielded no text
    #[error("No content extracted from {0}")]
    Empty(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::Communication(e.to_string())
    }
}
