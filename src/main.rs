//! CareerFind main entry point
//!
//! This is the command-line interface for the CareerFind email crawler.

use anyhow::Context;
use careerfind::automation::{automation_options, run_daily};
use careerfind::config::load_config_with_hash;
use careerfind::output::OutputFormat;
use careerfind::pipeline::{run_pipeline, NotifyMethod, PipelineOptions};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// CareerFind: find career contact emails for a location
///
/// CareerFind queries search engines for career and contact pages in a
/// location, extracts the email addresses they publish, and saves them to a
/// file, a SQLite database and optionally a Telegram chat.
#[derive(Parser, Debug)]
#[command(name = "careerfind")]
#[command(version)]
#[command(about = "Find career contact emails for a location", long_about = None)]
struct Cli {
    /// Filter by location (city/country)
    #[arg(short = 'L', long, required_unless_present = "automation")]
    location: Option<String>,

    /// Enable proxy support (requires proxy-address in config)
    #[arg(short, long)]
    proxy: bool,

    /// Search engines: google,bing,duckduckgo (comma-separated) or all
    #[arg(short = 'b', long, default_value = "all")]
    engines: String,

    /// Enable LinkedIn mode for job post emails
    #[arg(short = 'l', long)]
    linkedin: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// Notification method
    #[arg(short = 'm', long, value_enum, default_value_t = NotifyMethod::Telegram)]
    notify: NotifyMethod,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable daily automation
    #[arg(short, long)]
    automation: bool,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = "careerfind.toml")]
    config: PathBuf,

    /// Directory result files are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// SQLite results database
    #[arg(long, default_value = "careerfind.db")]
    database: PathBuf,

    /// Also append logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Failed to set up logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber
///
/// `RUST_LOG` overrides the default filter. With a log file, every event is
/// written both to the terminal and to the file.
fn setup_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("careerfind=debug,info")
        } else {
            EnvFilter::new("careerfind=info,warn")
        }
    });

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .with(file_layer)
        .init();

    Ok(())
}

/// Stops the crawl on Ctrl-C
fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping");
            cancel.cancel();
        }
    });
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (config, config_hash) =
        load_config_with_hash(&cli.config).context("Configuration error")?;
    if let Some(hash) = config_hash {
        tracing::info!("Configuration loaded from {} (hash: {})", cli.config.display(), hash);
    }

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    if let Some(location) = &cli.location {
        if cli.verbose {
            tracing::info!("Starting CareerFind with location: {}", location);
        }

        let options = PipelineOptions {
            location: location.clone(),
            engines: cli.engines.clone(),
            linkedin: cli.linkedin,
            proxy: cli.proxy,
            verbose: cli.verbose,
            output_format: cli.output,
            notify: cli.notify,
            output_dir: cli.output_dir.clone(),
            database: Some(cli.database.clone()),
            ..PipelineOptions::default()
        };

        let report = run_pipeline(&config, &options, &cancel).await?;
        tracing::info!(
            "Found {} pages with emails out of {} searched; saved to {}",
            report.results,
            report.pages,
            report.saved_to.display()
        );
    }

    if cli.automation {
        let options = automation_options(cli.output_dir, Some(cli.database));
        run_daily(&config, &options, &cancel).await;
    }

    if cli.verbose {
        tracing::info!("CareerFind execution completed");
    }

    Ok(())
}
