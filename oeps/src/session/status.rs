//! Observable session status.

use std::fmt;
use std::path::PathBuf;

/// Shown as soon as a session starts.
pub const STARTING_MESSAGE: &str = "Starting download...";

/// Shown while the archive is being packed.
pub const PACKING_MESSAGE: &str = "Building your ZIP archive, this may take a minute...";

/// Current state of a [`DownloadSession`](super::DownloadSession).
///
/// Published through a watch channel: the session is the only writer and any
/// number of renderers may read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No download in progress; a new one may start.
    #[default]
    Idle,
    /// Remote resources are being retrieved.
    Fetching { message: String },
    /// Payloads are being written into the archive.
    Packing { percent: u8 },
    /// The archive was written to disk.
    Saved { path: PathBuf },
    /// The session stopped with an error; a new one may start.
    Failed { message: String },
}

impl SessionStatus {
    /// True while fetching or packing.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionStatus::Fetching { .. } | SessionStatus::Packing { .. })
    }

    /// Packing percentage, if packing.
    pub fn packing_percent(&self) -> Option<u8> {
        match self {
            SessionStatus::Packing { percent } => Some(*percent),
            _ => None,
        }
    }

    /// Human-readable status line. Empty when idle.
    pub fn message(&self) -> String {
        match self {
            SessionStatus::Idle => String::new(),
            SessionStatus::Fetching { message } => message.clone(),
            SessionStatus::Packing { .. } => PACKING_MESSAGE.to_string(),
            SessionStatus::Saved { path } => format!("Saved {}", path.display()),
            SessionStatus::Failed { message } => format!("Download failed: {}", message),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
