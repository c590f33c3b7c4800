//! Error types for archive assembly.

use thiserror::Error;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors that can occur while packing the download archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The ZIP writer rejected an entry.
    #[error("failed to write archive entry: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing payload bytes failed.
    #[error("failed to write archive data: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking packing task did not complete.
    #[error("archive worker failed: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_display() {
        let err = ArchiveError::Worker("task panicked".to_string());
        assert_eq!(err.to_string(), "archive worker failed: task panicked");
    }
}
