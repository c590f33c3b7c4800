//! Init command - write a configuration file with defaults.

use oeps::config::{config_file_path, default_output_dir, ConfigFile};

use crate::error::CliError;

/// Run the init command.
///
/// Existing settings are kept; only an unset output directory is filled in.
pub fn run() -> Result<(), CliError> {
    let mut config = ConfigFile::load()?;
    if config.output.directory.is_none() {
        config.output.directory = Some(default_output_dir());
    }
    config.save()?;

    let path = config_file_path();
    println!("Configuration file: {}", path.display());
    println!();
    println!("Archives will be saved in {}", config.output_directory().display());
    println!("Edit this file or use 'oeps config set' to customize settings.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
