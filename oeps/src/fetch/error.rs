//! Error types for the fetch pipeline.

use thiserror::Error;

use crate::provider::ProviderError;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors that abort a fetch group.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The HTTP client reported a failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The per-request deadline elapsed.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// The session was cancelled while requests were outstanding.
    #[error("download cancelled")]
    Cancelled,

    /// The documentation listing could not be understood.
    #[error("failed to parse documentation listing from {url}: {reason}")]
    ListingParse { url: String, reason: String },
}

impl FetchError {
    /// Whether re-issuing the request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Provider(e) => e.is_retryable(),
            FetchError::Timeout { .. } => true,
            FetchError::Cancelled | FetchError::ListingParse { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = FetchError::Timeout {
            url: "https://host/a.csv".to_string(),
            timeout_secs: 60,
        };
        assert_eq!(err.to_string(), "request to https://host/a.csv timed out after 60s");
    }

    #[test]
    fn test_provider_error_is_transparent() {
        let err: FetchError = ProviderError::Status {
            url: "https://host/a.csv".to_string(),
            status: 500,
        }
        .into();
        assert_eq!(err.to_string(), "HTTP 500 from https://host/a.csv");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_cancelled_is_not_retryable() {
        assert!(!FetchError::Cancelled.is_retryable());
    }
}
