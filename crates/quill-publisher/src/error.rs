//! Error types for publishing

use thiserror::Error;

/// Errors raised while rendering or publishing an article
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PublishError {
    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// The site rejected the credentials
    #[error("Authentication rejected by {url} (HTTP {status})")]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Endpoint that rejected the request
        url: String,
    },

    /// Any other non-2xx reply
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Endpoint that failed
        url: String,
        /// Response body, for diagnostics
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Image payload could not be decoded
    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    /// No application password configured
    #[error("Missing application password: set {0} or configure it for the site")]
    MissingCredentials(String),

    /// Site configuration is unusable
    #[error("Invalid site configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for PublishError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PublishError::InvalidResponse(e.to_string())
        } else {
            PublishError::Communication(e.to_string())
        }
    }
}

impl From<base64::DecodeError> for PublishError {
    fn from(e: base64::DecodeError) -> Self {
        PublishError::InvalidImage(e.to_string())
    }
}
