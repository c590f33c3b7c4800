//! Error type shared by HTTP client implementations.

use thiserror::Error;

/// Errors returned by an [`AsyncHttpClient`](super::AsyncHttpClient).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The client's own deadline elapsed.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl ProviderError {
    /// Whether re-issuing the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Request { .. } | ProviderError::Timeout { .. } => true,
            ProviderError::ClientBuild(_) => false,
        }
    }
}
