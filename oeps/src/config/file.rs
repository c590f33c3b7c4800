//! INI-backed configuration file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;

use super::error::{ConfigError, ConfigResult};
use super::keys::ConfigKey;
use crate::fetch::{join_url, FetchConfig, RemoteSource, DEFAULT_PARALLEL, DEFAULT_TIMEOUT_SECS};
use crate::session::SessionConfig;

/// Raw-content prefix of the OEPS repository's `data_final` directory.
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/GeoDaCenter/opioid-policy-scan/main/data_final/";

/// GitHub contents API listing of the metadata directory.
pub const DEFAULT_DOCS_URL: &str =
    "https://api.github.com/repos/geodacenter/opioid-policy-scan/contents/data_final/metadata";

/// `[source]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    /// Prefix for dataset CSVs and geometry parts.
    pub base_url: String,
    /// Documentation listing endpoint.
    pub docs_url: String,
    /// Prefix for single documentation pages. Defaults to `<base_url>metadata/`.
    pub docs_base_url: Option<String>,
    /// Alternative dataset manifest (JSON).
    pub manifest: Option<PathBuf>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            docs_url: DEFAULT_DOCS_URL.to_string(),
            docs_base_url: None,
            manifest: None,
        }
    }
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub timeout_secs: u64,
    pub parallel: usize,
    pub max_retries: u32,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            parallel: DEFAULT_PARALLEL,
            max_retries: 0,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSettings {
    pub directory: Option<PathBuf>,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub source: SourceSettings,
    pub download: DownloadSettings,
    pub output: OutputSettings,
}

impl ConfigFile {
    /// Load from `~/.oeps/config.ini`.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&super::config_file_path())
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Build from parsed INI. Unknown sections and keys are ignored.
    pub fn from_ini(ini: &Ini) -> ConfigResult<Self> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Render as INI. Unset optional values are omitted.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Save to `~/.oeps/config.ini`.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&super::config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)?;
        tracing::debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Documentation page prefix, explicit or derived from `base_url`.
    pub fn docs_base_url(&self) -> String {
        self.source
            .docs_base_url
            .clone()
            .unwrap_or_else(|| join_url(&self.source.base_url, "metadata/"))
    }

    pub fn remote_source(&self) -> RemoteSource {
        RemoteSource {
            base_url: self.source.base_url.clone(),
            docs_listing_url: self.source.docs_url.clone(),
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::default()
            .with_timeout(Duration::from_secs(self.download.timeout_secs))
            .with_parallel(self.download.parallel)
            .with_max_retries(self.download.max_retries)
    }

    /// Configured output directory, or the platform download directory.
    pub fn output_directory(&self) -> PathBuf {
        self.output
            .directory
            .clone()
            .unwrap_or_else(super::default_output_dir)
    }

    /// Everything a download session needs from this file.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            source: self.remote_source(),
            fetch: self.fetch_config(),
            output_dir: self.output_directory(),
        }
    }
}
