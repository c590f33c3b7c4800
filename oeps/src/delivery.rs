//! Saving a finished archive.
//!
//! Archives are named `OEPS_DOWNLOAD_<YYYY-MM-DD>.zip` using the UTC date.
//! The bytes are written to a `.part` sibling first and renamed into place,
//! so an interrupted write never leaves a truncated archive under the final
//! name.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use thiserror::Error;

/// Prefix of every saved archive.
pub const ARCHIVE_PREFIX: &str = "OEPS_DOWNLOAD_";

/// Result type for delivery operations.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Errors that can occur while saving an archive.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Failed to create the output directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write or move the archive file.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Archive file name for a given date.
pub fn archive_file_name(date: NaiveDate) -> String {
    format!("{}{}.zip", ARCHIVE_PREFIX, date.format("%Y-%m-%d"))
}

/// Archive file name for today (UTC).
pub fn todays_archive_file_name() -> String {
    archive_file_name(Utc::now().date_naive())
}

/// Write `bytes` into `dir` under today's archive name.
///
/// The directory is created if needed. Returns the final path.
pub async fn save_archive(dir: &Path, bytes: &[u8]) -> DeliveryResult<PathBuf> {
    save_archive_as(dir, &todays_archive_file_name(), bytes).await
}

/// Write `bytes` into `dir/file_name` via a temporary `.part` file.
pub async fn save_archive_as(dir: &Path, file_name: &str, bytes: &[u8]) -> DeliveryResult<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DeliveryError::CreateDirFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let dest = dir.join(file_name);
    let partial = dir.join(format!("{}.part", file_name));

    if let Err(e) = write_then_rename(&partial, &dest, bytes).await {
        tokio::fs::remove_file(&partial).await.ok();
        return Err(e);
    }

    tracing::info!(path = %dest.display(), size = bytes.len(), "Archive saved");
    Ok(dest)
}

async fn write_then_rename(partial: &Path, dest: &Path, bytes: &[u8]) -> DeliveryResult<()> {
    tokio::fs::write(partial, bytes)
        .await
        .map_err(|e| DeliveryError::WriteFailed {
            path: partial.to_path_buf(),
            source: e,
        })?;
    tokio::fs::rename(partial, dest)
        .await
        .map_err(|e| DeliveryError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })
}
