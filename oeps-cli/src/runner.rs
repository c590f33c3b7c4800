//! Shared setup for commands that talk to the content host.

use std::future::Future;

use oeps::config::{log_directory, ConfigFile};
use oeps::logging::{init_logging, LoggingOptions, WorkerGuard};
use oeps::manifest::Manifest;
use tokio::runtime::Runtime;

use crate::error::CliError;

/// Log filter used with `--verbose` when `RUST_LOG` is unset.
const VERBOSE_FILTER: &str = "oeps=debug";

/// Loaded configuration, logging and an async runtime.
pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    _log_guard: WorkerGuard,
}

impl CliRunner {
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let mut options = LoggingOptions::new(log_directory()).with_stderr(verbose);
        if verbose {
            options = options.with_default_filter(VERBOSE_FILTER);
        }
        let log_guard = init_logging(&options)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        Ok(Self {
            config,
            runtime,
            _log_guard: log_guard,
        })
    }

    pub fn log_startup(&self, command: &str) {
        tracing::info!(version = oeps::VERSION, command, "oeps starting");
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Mutable access for command-line overrides.
    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// The configured dataset manifest, or the embedded one.
    pub fn manifest(&self) -> Result<Manifest, CliError> {
        Ok(Manifest::load_or_builtin(
            self.config.source.manifest.as_deref(),
        )?)
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
