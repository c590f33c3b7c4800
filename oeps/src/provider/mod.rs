//! Remote content host access.
//!
//! All network I/O goes through the [`AsyncHttpClient`] trait so the fetch
//! pipeline can be exercised against an in-memory client in tests.
//!
//! ```ignore
//! use oeps::provider::{AsyncHttpClient, ReqwestClient};
//!
//! let client = ReqwestClient::new()?;
//! let bytes = client.get("https://example.com/data.csv").await?;
//! ```

mod http;
mod types;

pub use http::{AsyncHttpClient, ReqwestClient};
pub use types::ProviderError;

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
