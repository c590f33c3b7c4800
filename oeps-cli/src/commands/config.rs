//! Config command - inspect and edit `~/.oeps/config.ini`.
//!
//! `show` marks each value with where it came from: the built-in default
//! or the config file. `show --ini` prints the effective settings as a
//! file that can be saved and edited by hand.

use std::io;
use std::path::Path;

use clap::Subcommand;
use console::style;
use oeps::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show every setting and whether it is a default
    #[command(alias = "list")]
    Show {
        /// Print the effective settings in INI form
        #[arg(long)]
        ini: bool,
    },

    /// Print one setting, e.g. `download.parallel`
    Get { key: String },

    /// Change a setting (an empty value clears optional settings)
    Set { key: String, value: String },

    /// Restore a setting to its built-in default
    Reset { key: String },

    /// Print the config file location
    Path,
}

/// Run a config subcommand against the user's config file.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    match command {
        ConfigCommands::Show { ini: false } => {
            let config = ConfigFile::load_from(&path)?;
            for line in show_lines(&config) {
                println!("{}", line);
            }
        }
        ConfigCommands::Show { ini: true } => {
            let config = ConfigFile::load_from(&path)?;
            config
                .to_ini()
                .write_to(&mut io::stdout())
                .map_err(|e| CliError::Config(format!("Failed to print settings: {}", e)))?;
        }
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            let config = ConfigFile::load_from(&path)?;
            println!("{}", display_value(&key.get(&config)));
        }
        ConfigCommands::Set { key, value } => {
            let key = parse_key(&key)?;
            let config = update(&path, key, |config| key.set(config, &value))?;
            println!("{} = {}", key, display_value(&key.get(&config)));
        }
        ConfigCommands::Reset { key } => {
            let key = parse_key(&key)?;
            let config = update(&path, key, |config| {
                key.reset(config);
                Ok(())
            })?;
            println!("{} = {} {}", key, display_value(&key.get(&config)), style("(default)").dim());
        }
        ConfigCommands::Path => {
            let state = if path.exists() { "" } else { " (not created yet)" };
            println!("{}{}", path.display(), state);
        }
    }
    Ok(())
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        let known: Vec<_> = ConfigKey::all().iter().map(ConfigKey::name).collect();
        CliError::Config(format!(
            "Unknown setting '{}'. Known settings: {}",
            key,
            known.join(", ")
        ))
    })
}

/// Load, change one setting, and save back to `path`.
fn update(
    path: &Path,
    key: ConfigKey,
    change: impl FnOnce(&mut ConfigFile) -> oeps::config::ConfigResult<()>,
) -> Result<ConfigFile, CliError> {
    let mut config = ConfigFile::load_from(path)?;
    change(&mut config)?;
    config.save_to(path)?;
    tracing::info!(key = %key, path = %path.display(), "Setting updated");
    Ok(config)
}

/// One aligned line per setting: name, value and origin.
fn show_lines(config: &ConfigFile) -> Vec<String> {
    let width = ConfigKey::all()
        .iter()
        .map(|key| key.name().len())
        .max()
        .unwrap_or(0);

    ConfigKey::all()
        .iter()
        .map(|key| {
            let origin = if key.is_default(config) { "default" } else { "file" };
            format!(
                "{:width$}  {}  ({})",
                key.name(),
                display_value(&key.get(config)),
                origin,
                width = width
            )
        })
        .collect()
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
