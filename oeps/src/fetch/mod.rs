//! Remote fetch pipeline.
//!
//! Turns a resolved [`Selection`](crate::manifest::Selection) into concrete
//! requests and retrieves them:
//! - Request construction and listing parsing (`plan`)
//! - Bounded, cancellable, group-sequenced retrieval (`orchestrator`)
//! - Single metadata page retrieval for the docs viewer (`docs`)
//!
//! # Architecture
//!
//! ```text
//! FetchOrchestrator::fetch_all
//!     │
//!     ├── list_docs ──► docs group      (status: "Downloaded N documentation files...")
//!     ├── data group                    (status: "Downloaded N CSV files...")
//!     └── geometry group (entry × part)
//! ```

mod docs;
mod error;
mod orchestrator;
mod plan;

pub use docs::{markdown_doc_url, rewrite_doc_links};
pub use error::{FetchError, FetchResult};
pub use orchestrator::{
    data_done_message, docs_done_message, FetchConfig, FetchOrchestrator, FetchedBundle,
    RemoteSource, StatusCallback, DEFAULT_PARALLEL, DEFAULT_TIMEOUT_SECS,
};
pub use plan::{
    data_requests, doc_requests, geometry_part, geometry_requests, join_url, parse_listing,
    DocLink, FetchRequest, FetchedResource, ResourceGroup,
};
