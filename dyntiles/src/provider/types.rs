//! Provider types

use thiserror::Error;

/// Errors that can occur while talking to a remote tile server.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Request did not complete within the configured timeout
    #[error("Request to {0} timed out")]
    Timeout(String),
}

impl ProviderError {
    /// Whether the server was reached and reported the resource missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::Status { status: 404, .. })
    }
}
