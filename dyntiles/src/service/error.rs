//! Service error types.

use crate::compositor::CompositeError;
use crate::kml::LinkError;
use crate::provider::ProviderError;
use crate::query::QueryError;
use std::fmt;

/// Errors that can occur while serving a request.
#[derive(Debug)]
pub enum ServiceError {
    /// Failed to create HTTP client
    HttpClientError(ProviderError),
    /// Request arguments were missing or malformed
    InvalidQuery(QueryError),
    /// Tile could not be composited
    CompositeFailed(CompositeError),
    /// Link document could not be generated
    LinkFailed(LinkError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpClientError(e) => write!(f, "HTTP client error: {}", e),
            Self::InvalidQuery(e) => write!(f, "Invalid request: {}", e),
            Self::CompositeFailed(e) => write!(f, "Tile composition failed: {}", e),
            Self::LinkFailed(e) => write!(f, "Link document failed: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClientError(e) => Some(e),
            Self::InvalidQuery(e) => Some(e),
            Self::CompositeFailed(e) => Some(e),
            Self::LinkFailed(e) => Some(e),
        }
    }
}

impl From<QueryError> for ServiceError {
    fn from(e: QueryError) -> Self {
        Self::InvalidQuery(e)
    }
}

impl From<CompositeError> for ServiceError {
    fn from(e: CompositeError) -> Self {
        Self::CompositeFailed(e)
    }
}

impl From<LinkError> for ServiceError {
    fn from(e: LinkError) -> Self {
        Self::LinkFailed(e)
    }
}
