//! Download session state machine.
//!
//! A [`DownloadSession`] runs one download at a time:
//!
//! ```text
//! Idle ──run──► Fetching ──► Packing ──► Saved ──► Idle
//!                  │            │
//!                  └────────────┴──► Failed (startable again)
//! ```
//!
//! Status is published on a `tokio::sync::watch` channel. The session is the
//! only writer; renderers call [`DownloadSession::subscribe`] and read the
//! latest value whenever it changes.

mod error;
mod status;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::archive::ArchiveBuilder;
use crate::delivery::save_archive;
use crate::facet::FilterState;
use crate::fetch::{FetchConfig, FetchError, FetchOrchestrator, RemoteSource};
use crate::manifest::{resolve, Manifest, Selection};
use crate::provider::AsyncHttpClient;

pub use error::{SessionError, SessionResult};
pub use status::{SessionStatus, PACKING_MESSAGE, STARTING_MESSAGE};

/// Everything a session needs besides the HTTP client.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub source: RemoteSource,
    pub fetch: FetchConfig,
    /// Directory the finished archive is written to.
    pub output_dir: PathBuf,
}

/// Runs downloads and publishes their status.
pub struct DownloadSession<C: AsyncHttpClient> {
    orchestrator: FetchOrchestrator<C>,
    source: RemoteSource,
    output_dir: PathBuf,
    status: Arc<watch::Sender<SessionStatus>>,
    busy: AtomicBool,
}

impl<C: AsyncHttpClient> DownloadSession<C> {
    pub fn new(client: C, config: SessionConfig) -> Self {
        let (status, _) = watch::channel(SessionStatus::Idle);
        Self {
            orchestrator: FetchOrchestrator::new(client, config.fetch),
            source: config.source,
            output_dir: config.output_dir,
            status: Arc::new(status),
            busy: AtomicBool::new(false),
        }
    }

    /// Receiver for status updates.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Latest published status.
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// True while a run is in progress.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Resolve filters without fetching anything.
    pub fn plan(&self, manifest: &Manifest, filters: &FilterState) -> Selection {
        resolve(manifest, filters)
    }

    /// Download, pack and save everything matching `filters`.
    ///
    /// Returns [`SessionError::Busy`] without side effects if a run is
    /// already in progress. On failure the status becomes
    /// [`SessionStatus::Failed`] and a new run may be started.
    pub async fn run(
        &self,
        manifest: &Manifest,
        filters: &FilterState,
        token: &CancellationToken,
    ) -> SessionResult<PathBuf> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(SessionError::Busy);
        }
        let _busy = BusyGuard(&self.busy);

        info!(%filters, "Download session started");
        match self.run_inner(manifest, filters, token).await {
            Ok(path) => {
                self.publish(SessionStatus::Saved { path: path.clone() });
                self.publish(SessionStatus::Idle);
                Ok(path)
            }
            Err(e) => {
                if e.is_cancelled() {
                    info!("Download session cancelled");
                } else {
                    error!(error = %e, "Download session failed");
                }
                self.publish(SessionStatus::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        manifest: &Manifest,
        filters: &FilterState,
        token: &CancellationToken,
    ) -> SessionResult<PathBuf> {
        self.publish(SessionStatus::Fetching {
            message: STARTING_MESSAGE.to_string(),
        });

        let selection = resolve(manifest, filters);
        let on_status = |message: String| self.publish(SessionStatus::Fetching { message });
        let bundle = self
            .orchestrator
            .fetch_all(&self.source, &selection, token, &on_status)
            .await?;

        if token.is_cancelled() {
            return Err(FetchError::Cancelled.into());
        }

        let sender = Arc::clone(&self.status);
        let archive = ArchiveBuilder::from_bundle(bundle)
            .build_blocking(move |percent| {
                sender.send_replace(SessionStatus::Packing { percent });
            })
            .await?;

        if token.is_cancelled() {
            return Err(FetchError::Cancelled.into());
        }

        let path = save_archive(&self.output_dir, archive.bytes()).await?;
        info!(path = %path.display(), entries = archive.entries().len(), "Download session complete");
        Ok(path)
    }

    fn publish(&self, status: SessionStatus) {
        self.status.send_replace(status);
    }
}

/// Clears the busy flag when a run ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
