//! OEPS - Opioid Environment Policy Scan data bundler
//!
//! This library implements the bulk-download path of the OEPS data portal:
//! facet selection, manifest resolution, concurrent retrieval from the public
//! content host, store-only ZIP packing and delivery to disk.
//!
//! # Architecture
//!
//! ```text
//! FilterState ──► resolve() ──► FetchOrchestrator ──► ArchiveBuilder ──► save_archive()
//!  (facet)        (manifest)     (fetch, bounded)      (archive)          (delivery)
//!                                        │
//!                                 DownloadSession (session)
//!                                 publishes SessionStatus
//! ```
//!
//! # Example
//!
//! ```ignore
//! use oeps::config::ConfigFile;
//! use oeps::facet::{FilterState, Scale};
//! use oeps::manifest::Manifest;
//! use oeps::provider::ReqwestClient;
//! use oeps::session::DownloadSession;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ConfigFile::load()?;
//! let manifest = Manifest::builtin()?;
//! let mut filters = FilterState::new();
//! filters.toggle_scale(Scale::State);
//!
//! let client = ReqwestClient::new()?;
//! let session = DownloadSession::new(client, config.session_config());
//! let path = session.run(&manifest, &filters, &CancellationToken::new()).await?;
//! ```

pub mod archive;
pub mod config;
pub mod delivery;
pub mod facet;
pub mod fetch;
pub mod logging;
pub mod manifest;
pub mod provider;
pub mod session;

/// Library version, used in the CLI banner and the HTTP user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
