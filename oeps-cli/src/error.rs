//! CLI error type and exit codes.

use std::fmt;

use oeps::config::ConfigError;
use oeps::facet::FacetError;
use oeps::fetch::FetchError;
use oeps::logging::LoggingError;
use oeps::manifest::ManifestError;
use oeps::provider::ProviderError;
use oeps::session::SessionError;

/// Exit code for an interrupted command (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Bad setting or missing option.
    Config(String),
    ConfigFile(ConfigError),
    Facet(FacetError),
    Manifest(ManifestError),
    Provider(ProviderError),
    Fetch(FetchError),
    Session(SessionError),
    Logging(LoggingError),
    /// The async runtime could not be started.
    Runtime(std::io::Error),
    /// Terminal prompt failed.
    Interaction(String),
    /// The user pressed Ctrl+C.
    Cancelled,
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Cancelled => EXIT_INTERRUPTED,
            CliError::Session(e) if e.is_cancelled() => EXIT_INTERRUPTED,
            CliError::Fetch(FetchError::Cancelled) => EXIT_INTERRUPTED,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Facet(e) => write!(f, "{}", e),
            CliError::Manifest(e) => write!(f, "Failed to load manifest: {}", e),
            CliError::Provider(e) => write!(f, "{}", e),
            CliError::Fetch(e) => write!(f, "{}", e),
            CliError::Session(e) => write!(f, "Download failed: {}", e),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Interaction(msg) => write!(f, "Prompt failed: {}", msg),
            CliError::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<FacetError> for CliError {
    fn from(e: FacetError) -> Self {
        CliError::Facet(e)
    }
}

impl From<ManifestError> for CliError {
    fn from(e: ManifestError) -> Self {
        CliError::Manifest(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Fetch(e)
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        if e.is_cancelled() {
            CliError::Cancelled
        } else {
            CliError::Session(e)
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::Interaction(e.to_string())
    }
}
