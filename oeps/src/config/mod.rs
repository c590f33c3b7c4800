//! User configuration.
//!
//! Settings live in `~/.oeps/config.ini`:
//!
//! ```ini
//! [source]
//! base_url = https://raw.githubusercontent.com/GeoDaCenter/opioid-policy-scan/main/data_final/
//! docs_url = https://api.github.com/repos/geodacenter/opioid-policy-scan/contents/data_final/metadata
//! ; docs_base_url = <base_url>metadata/
//! ; manifest = /path/to/csv_files.json
//!
//! [download]
//! timeout = 60
//! parallel = 8
//! max_retries = 0
//!
//! [output]
//! ; directory = ~/Downloads
//! ```
//!
//! A missing file means defaults. Command-line flags override file values.

mod error;
mod file;
mod keys;

use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};
pub use file::{
    ConfigFile, DownloadSettings, OutputSettings, SourceSettings, DEFAULT_BASE_URL,
    DEFAULT_DOCS_URL,
};
pub use keys::ConfigKey;

/// Name of the per-user configuration directory under the home directory.
const CONFIG_DIR_NAME: &str = ".oeps";

const CONFIG_FILE_NAME: &str = "config.ini";

/// `~/.oeps`, or `./.oeps` when no home directory is known.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// `~/.oeps/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Directory for log files.
pub fn log_directory() -> PathBuf {
    config_directory().join("logs")
}

/// Where archives go when neither the config nor the command line says.
pub fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}
