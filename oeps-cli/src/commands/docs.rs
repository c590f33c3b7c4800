//! Docs commands - browse the dataset documentation pages.

use clap::Subcommand;
use oeps::fetch::FetchOrchestrator;
use oeps::provider::ReqwestClient;
use tokio_util::sync::CancellationToken;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Docs subcommands.
#[derive(Debug, Subcommand)]
pub enum DocsCommands {
    /// List the documentation files included in every download
    List,

    /// Print one documentation page as markdown
    Show {
        /// Page name, e.g. Access_Health
        name: String,
    },
}

/// Run a docs subcommand.
pub fn run(command: DocsCommands, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("docs");

    let config = runner.config();
    let orchestrator = FetchOrchestrator::new(ReqwestClient::new()?, config.fetch_config());
    let token = CancellationToken::new();

    match command {
        DocsCommands::List => {
            let links = runner.block_on(orchestrator.list_docs(&config.source.docs_url, &token))?;
            if links.is_empty() {
                println!("No documentation files listed.");
            }
            for link in links {
                println!("{}", link.name.strip_suffix(".md").unwrap_or(&link.name));
            }
        }
        DocsCommands::Show { name } => {
            let page = runner.block_on(orchestrator.fetch_markdown_doc(
                &config.docs_base_url(),
                &name,
                &token,
            ))?;
            println!("{}", page);
        }
    }

    Ok(())
}
