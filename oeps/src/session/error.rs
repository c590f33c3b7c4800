//! Session error type.

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::delivery::DeliveryError;
use crate::fetch::FetchError;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that end a download session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A session is already running on this instance.
    #[error("a download is already in progress")]
    Busy,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl SessionError {
    /// True when the session ended because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionError::Fetch(FetchError::Cancelled))
    }
}
