//! Resolve command - show what a filter selection contains.

use clap::Args;
use oeps::config::ConfigFile;
use oeps::fetch::{data_requests, geometry_requests};
use oeps::manifest::{resolve, Manifest};

use super::common::{print_selection, FilterArgs};
use crate::error::CliError;

/// Arguments for the resolve command.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Also print the URL of every file
    #[arg(long)]
    pub urls: bool,
}

/// Run the resolve command. Nothing is fetched.
pub fn run(args: ResolveArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let manifest = Manifest::load_or_builtin(config.source.manifest.as_deref())?;

    let filters = args.filters.build()?;
    let selection = resolve(&manifest, &filters);
    print_selection(&filters, &selection);

    if args.urls {
        println!();
        let base_url = &config.source.base_url;
        for request in data_requests(base_url, &selection)
            .iter()
            .chain(geometry_requests(base_url, &selection).iter())
        {
            println!("{}", request.url);
        }
    }

    Ok(())
}
