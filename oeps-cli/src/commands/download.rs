//! Download command - fetch a selection and save it as one archive.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use oeps::fetch::{data_requests, geometry_requests};
use oeps::provider::ReqwestClient;
use oeps::session::{DownloadSession, SessionStatus};
use tokio_util::sync::CancellationToken;

use super::common::{print_selection, FilterArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the download command.
#[derive(Debug, Args)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Directory to save the archive in
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show what would be downloaded without fetching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum concurrent requests
    #[arg(long)]
    pub parallel: Option<usize>,

    /// Retries for each failed request
    #[arg(long)]
    pub retries: Option<u32>,
}

/// Run the download command.
pub fn run(args: DownloadArgs, verbose: bool) -> Result<(), CliError> {
    let mut runner = CliRunner::new(verbose)?;
    runner.log_startup("download");

    // CLI flags take precedence over the config file
    let config = runner.config_mut();
    if let Some(timeout) = args.timeout {
        config.download.timeout_secs = timeout.max(1);
    }
    if let Some(parallel) = args.parallel {
        config.download.parallel = parallel.max(1);
    }
    if let Some(retries) = args.retries {
        config.download.max_retries = retries;
    }
    if let Some(output) = args.output {
        config.output.directory = Some(output);
    }
    let config = runner.config().clone();

    let manifest = runner.manifest()?;
    let filters = args.filters.build()?;

    let client = ReqwestClient::new()?;
    let session = DownloadSession::new(client, config.session_config());
    let selection = session.plan(&manifest, &filters);

    println!("OEPS Download v{}", oeps::VERSION);
    println!("==================");
    println!();
    print_selection(&filters, &selection);
    println!();

    if args.dry_run {
        let base_url = &config.source.base_url;
        println!("{}", style("Requests").bold());
        println!("  {} (documentation listing)", config.source.docs_url);
        for request in data_requests(base_url, &selection)
            .iter()
            .chain(geometry_requests(base_url, &selection).iter())
        {
            println!("  {}", request.url);
        }
        println!();
        println!("Archive would be saved in {}", session.output_dir().display());
        return Ok(());
    }

    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, cancelling download...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let display = StatusDisplay::new(Term::stdout().is_term());
    let result = runner.block_on(async {
        let mut status = session.subscribe();
        let run = session.run(&manifest, &filters, &token);
        tokio::pin!(run);

        loop {
            tokio::select! {
                result = &mut run => break result,
                Ok(()) = status.changed() => display.update(&status.borrow_and_update()),
            }
        }
    });
    display.finish();

    let path = result?;
    println!(
        "{} Saved {}",
        style("✓").green().bold(),
        style(path.display()).bold()
    );
    Ok(())
}

/// Renders session status as a spinner, then a packing bar.
///
/// Without a terminal, each new status line is printed instead.
struct StatusDisplay {
    bar: ProgressBar,
    interactive: bool,
}

impl StatusDisplay {
    fn new(interactive: bool) -> Self {
        let bar = if interactive {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar, interactive }
    }

    fn update(&self, status: &SessionStatus) {
        if !self.interactive {
            // Print fetch steps and the start of packing only
            if status.is_busy() && status.packing_percent().unwrap_or(0) == 0 {
                println!("{}", status.message());
            }
            return;
        }

        match status {
            SessionStatus::Packing { percent } => {
                if self.bar.length() != Some(100) {
                    self.bar.set_length(100);
                    self.bar.set_style(
                        ProgressStyle::default_bar()
                            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% | {msg}")
                            .unwrap_or_else(|_| ProgressStyle::default_bar())
                            .progress_chars("=>-"),
                    );
                    self.bar.set_message(status.message());
                }
                self.bar.set_position(u64::from(*percent));
            }
            _ => self.bar.set_message(status.message()),
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
