//! Typed access to individual settings by `section.key` name.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::error::{ConfigError, ConfigResult};
use super::file::ConfigFile;

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    SourceBaseUrl,
    SourceDocsUrl,
    SourceDocsBaseUrl,
    SourceManifest,
    DownloadTimeout,
    DownloadParallel,
    DownloadMaxRetries,
    OutputDirectory,
}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::SourceBaseUrl,
            ConfigKey::SourceDocsUrl,
            ConfigKey::SourceDocsBaseUrl,
            ConfigKey::SourceManifest,
            ConfigKey::DownloadTimeout,
            ConfigKey::DownloadParallel,
            ConfigKey::DownloadMaxRetries,
            ConfigKey::OutputDirectory,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::SourceBaseUrl
            | ConfigKey::SourceDocsUrl
            | ConfigKey::SourceDocsBaseUrl
            | ConfigKey::SourceManifest => "source",
            ConfigKey::DownloadTimeout
            | ConfigKey::DownloadParallel
            | ConfigKey::DownloadMaxRetries => "download",
            ConfigKey::OutputDirectory => "output",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::SourceBaseUrl => "base_url",
            ConfigKey::SourceDocsUrl => "docs_url",
            ConfigKey::SourceDocsBaseUrl => "docs_base_url",
            ConfigKey::SourceManifest => "manifest",
            ConfigKey::DownloadTimeout => "timeout",
            ConfigKey::DownloadParallel => "parallel",
            ConfigKey::DownloadMaxRetries => "max_retries",
            ConfigKey::OutputDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text. Unset optional values are empty.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::SourceBaseUrl => config.source.base_url.clone(),
            ConfigKey::SourceDocsUrl => config.source.docs_url.clone(),
            ConfigKey::SourceDocsBaseUrl => config.source.docs_base_url.clone().unwrap_or_default(),
            ConfigKey::SourceManifest => path_text(config.source.manifest.as_ref()),
            ConfigKey::DownloadTimeout => config.download.timeout_secs.to_string(),
            ConfigKey::DownloadParallel => config.download.parallel.to_string(),
            ConfigKey::DownloadMaxRetries => config.download.max_retries.to_string(),
            ConfigKey::OutputDirectory => path_text(config.output.directory.as_ref()),
        }
    }

    /// Validate and store `value`. An empty value clears optional settings.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> ConfigResult<()> {
        let value = value.trim();
        let name = self.name();
        match self {
            ConfigKey::SourceBaseUrl => config.source.base_url = parse_url(&name, value)?,
            ConfigKey::SourceDocsUrl => config.source.docs_url = parse_url(&name, value)?,
            ConfigKey::SourceDocsBaseUrl => {
                config.source.docs_base_url = if value.is_empty() {
                    None
                } else {
                    Some(parse_url(&name, value)?)
                }
            }
            ConfigKey::SourceManifest => config.source.manifest = parse_path(value),
            ConfigKey::DownloadTimeout => {
                config.download.timeout_secs = parse_positive(&name, value)?
            }
            ConfigKey::DownloadParallel => {
                config.download.parallel = parse_positive(&name, value)?
            }
            ConfigKey::DownloadMaxRetries => {
                config.download.max_retries = value
                    .parse()
                    .map_err(|_| ConfigError::invalid(&name, value, "expected a whole number"))?
            }
            ConfigKey::OutputDirectory => config.output.directory = parse_path(value),
        }
        Ok(())
    }

    /// Restore the built-in default.
    pub fn reset(&self, config: &mut ConfigFile) {
        let defaults = ConfigFile::default();
        match self {
            ConfigKey::SourceBaseUrl => config.source.base_url = defaults.source.base_url,
            ConfigKey::SourceDocsUrl => config.source.docs_url = defaults.source.docs_url,
            ConfigKey::SourceDocsBaseUrl => {
                config.source.docs_base_url = defaults.source.docs_base_url
            }
            ConfigKey::SourceManifest => config.source.manifest = defaults.source.manifest,
            ConfigKey::DownloadTimeout => {
                config.download.timeout_secs = defaults.download.timeout_secs
            }
            ConfigKey::DownloadParallel => config.download.parallel = defaults.download.parallel,
            ConfigKey::DownloadMaxRetries => {
                config.download.max_retries = defaults.download.max_retries
            }
            ConfigKey::OutputDirectory => config.output.directory = defaults.output.directory,
        }
    }

    /// True when the value matches the built-in default.
    pub fn is_default(&self, config: &ConfigFile) -> bool {
        self.get(config) == self.get(&ConfigFile::default())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn path_text(path: Option<&PathBuf>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

fn parse_url(name: &str, value: &str) -> ConfigResult<String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.to_string())
    } else {
        Err(ConfigError::invalid(name, value, "expected an http(s) URL"))
    }
}

/// Empty clears the path; a leading `~/` expands to the home directory.
fn parse_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        return None;
    }
    match (value.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => Some(home.join(rest)),
        _ => Some(PathBuf::from(value)),
    }
}

fn parse_positive<T>(name: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr + PartialOrd + From<u8>,
{
    match value.parse::<T>() {
        Ok(n) if n >= T::from(1) => Ok(n),
        _ => Err(ConfigError::invalid(name, value, "expected a number of at least 1")),
    }
}
