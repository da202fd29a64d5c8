// CLI module - User-facing command-line interface

pub mod output;

use crate::config::{ProjectSettings, TailOptions};
use crate::error::Result;
use crate::logs::LogPoller;
use crate::source::CloudLoggingClient;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Cloudtail - print and watch Cloud Logging entries for a project
#[derive(Parser, Debug)]
#[command(name = "cloudtail")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Settings file (defaults to .cloudtail.toml or .cloudtail.json in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project id, overriding the settings file
    #[arg(short, long)]
    project: Option<String>,

    /// Print whole entries as JSON
    #[arg(long)]
    json: bool,

    /// Keep polling for new entries until interrupted
    #[arg(short, long)]
    watch: bool,

    /// Milliseconds between polls in watch mode
    #[arg(long, value_name = "MS")]
    poll_interval: Option<u64>,

    /// Leave timestamps out of rendered lines
    #[arg(short, long)]
    simplified: bool,

    /// Show debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Run the CLI application
    pub async fn run() -> Result<()> {
        let cli = Cli::parse();
        init_tracing(cli.verbose);
        cli.execute().await
    }

    /// Execute the parsed arguments
    async fn execute(&self) -> Result<()> {
        let cwd = std::env::current_dir()?;
        let settings = self.settings(&cwd)?;
        let options = self.tail_options(&settings.tail);
        options.validate()?;

        let token = settings.resolve_access_token()?;
        let client = CloudLoggingClient::new(
            settings.endpoint.as_str(),
            token,
            settings.request_timeout(),
        );
        let mut poller = LogPoller::new(
            client,
            settings.project_ref(),
            settings.credentials,
            &options,
        );

        if !options.watch {
            let printed = poller.run_once().await?;
            if printed.is_empty() {
                output::print_info("No log entries found");
            }
            return Ok(());
        }

        let cancel = CancellationToken::new();
        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            }
        });

        output::print_info(&format!(
            "Watching logs for {} (Ctrl+C to stop)",
            settings.project_ref()
        ));
        poller.run_watch(cancel).await
    }

    /// Load settings from `--config` or the first settings file in `dir`,
    /// then apply `--project` and validate
    pub fn settings(&self, dir: &Path) -> Result<ProjectSettings> {
        let path = self
            .config
            .clone()
            .or_else(|| ProjectSettings::discover(dir));

        let mut settings = match path {
            Some(path) => ProjectSettings::read(&path)?,
            None => ProjectSettings::new(""),
        };

        if let Some(project) = &self.project {
            settings.project_id = project.clone();
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Merge command-line flags over the tail options from the settings file
    pub fn tail_options(&self, defaults: &TailOptions) -> TailOptions {
        TailOptions {
            json: self.json || defaults.json,
            watch: self.watch || defaults.watch,
            poll_interval_ms: self.poll_interval.unwrap_or(defaults.poll_interval_ms),
            simplified: self.simplified || defaults.simplified,
            overlap_intervals: defaults.overlap_intervals,
        }
    }
}

/// Install the stderr tracing subscriber; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second install (tests, embedding) is not an error worth surfacing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
