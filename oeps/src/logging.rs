//! Logging setup.
//!
//! Log records go to `<log_dir>/oeps.log` through a non-blocking writer.
//! The filter comes from `RUST_LOG` when set, otherwise the given default.
//! Keep the returned guard alive for the life of the process or buffered
//! records are lost on exit.

use std::path::PathBuf;

use thiserror::Error;
use time::macros::format_description;
use time::UtcOffset;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub use tracing_appender::non_blocking::WorkerGuard;

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "oeps.log";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "oeps=info";

/// Errors that can occur while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file: {0}")]
    Appender(String),

    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

/// Options for [`init_logging`].
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    pub dir: PathBuf,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_filter: String,
    /// Also write records to stderr.
    pub stderr: bool,
}

impl LoggingOptions {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            default_filter: DEFAULT_FILTER.to_string(),
            stderr: false,
        }
    }

    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    pub fn with_stderr(mut self, stderr: bool) -> Self {
        self.stderr = stderr;
        self
    }
}

/// Install the global subscriber.
pub fn init_logging(options: &LoggingOptions) -> Result<WorkerGuard, LoggingError> {
    std::fs::create_dir_all(&options.dir).map_err(|e| LoggingError::CreateDir {
        path: options.dir.clone(),
        source: e,
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(&options.dir)
        .map_err(|e| LoggingError::Appender(e.to_string()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_filter));

    // Local offset lookup can fail on multi-threaded Unix processes
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"),
    );

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(timer.clone());
    let stderr_layer = options.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(timer)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = LoggingOptions::new("/tmp/logs");
        assert_eq!(options.default_filter, "oeps=info");
        assert!(!options.stderr);

        let options = options.with_default_filter("oeps=debug").with_stderr(true);
        assert_eq!(options.default_filter, "oeps=debug");
        assert!(options.stderr);
    }
}
