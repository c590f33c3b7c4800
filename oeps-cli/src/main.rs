//! OEPS CLI - filter, fetch and bundle Opioid Environment Policy Scan data.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;
use commands::docs::DocsCommands;
use commands::download::DownloadArgs;
use commands::resolve::ResolveArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "oeps", version, about, long_about = None)]
struct Cli {
    /// Also print log records to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download the selected tables, geometry and docs as one ZIP archive
    Download(DownloadArgs),

    /// Show which files a selection contains without downloading
    Resolve(ResolveArgs),

    /// Browse dataset documentation
    #[command(subcommand)]
    Docs(DocsCommands),

    /// View or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Create the configuration file
    Init,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Download(args) => commands::download::run(args, cli.verbose),
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Docs(command) => commands::docs::run(command, cli.verbose),
        Commands::Config(command) => commands::config::run(command),
        Commands::Init => commands::init::run(),
    }
}
