//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

use super::types::ProviderError;

/// Connect timeout applied to every request.
const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Trait for async HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body or an error. Non-success statuses are errors.
    fn get(&self, url: &str) -> impl Future<Output = Result<Bytes, ProviderError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with no overall request deadline.
    ///
    /// Per-request deadlines are applied by the fetch orchestrator.
    pub fn new() -> Result<Self, ProviderError> {
        // The GitHub contents API rejects requests without a user agent
        let client = reqwest::Client::builder()
            .user_agent(format!("oeps/{}", crate::VERSION))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    fn get(&self, url: &str) -> impl Future<Output = Result<Bytes, ProviderError>> + Send {
        let request = self.client.get(url);
        let url = url.to_string();

        async move {
            let response = request.send().await.map_err(|e| classify(&url, e))?;

            // Check HTTP status
            let status = response.status();
            if !status.is_success() {
                return Err(ProviderError::Status {
                    url,
                    status: status.as_u16(),
                });
            }

            // Read response body
            response.bytes().await.map_err(|e| classify(&url, e))
        }
    }
}

fn classify(url: &str, e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout {
            url: url.to_string(),
        }
    } else {
        ProviderError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}
