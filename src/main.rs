//! Site-Ledger main entry point
//!
//! This is the command-line interface for the Site-Ledger page inventory crawler.

use anyhow::Context;
use clap::Parser;
use site_ledger::config::{load_settings, validate_origin, FetchMode, Settings};
use site_ledger::crawler::{Coordinator, FetchBackend};
use site_ledger::output::CsvSink;
use site_ledger::{ConfigError, CrawlConfig};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Site-Ledger: a single-origin page inventory crawler
///
/// Site-Ledger walks every page reachable from ORIGIN without leaving its
/// host, and writes each page's URL, title and meta description to a CSV
/// file. Press Ctrl+C to stop early; pages collected so far are still saved.
#[derive(Parser, Debug)]
#[command(name = "site-ledger")]
#[command(version = "1.0.0")]
#[command(about = "Inventory every page of one site as CSV", long_about = None)]
struct Cli {
    /// Starting URL (must begin with http:// or https://)
    #[arg(value_name = "ORIGIN", value_parser = origin_arg)]
    origin: String,

    /// Output CSV file [default: <host>_<YYYYmmdd_HHMM>.csv]
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Leave the timestamp out of the default output file name
    #[arg(long, conflicts_with = "output")]
    no_timestamp: bool,

    /// Delay between requests in seconds [default: 0.5, or 1.0 with --render]
    #[arg(short, long, value_name = "SECS")]
    delay: Option<f64>,

    /// Render pages in a headless browser before extracting
    #[arg(long)]
    render: bool,

    /// Show the browser window while rendering
    #[arg(long, requires = "render")]
    no_headless: bool,

    /// Number of concurrent workers
    #[arg(short = 'j', long, value_name = "N")]
    concurrency: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Path to TOML settings file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line flags on top of file settings
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(delay) = self.delay {
            settings.crawler.delay_seconds = Some(delay);
        }
        if let Some(concurrency) = self.concurrency {
            settings.crawler.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            settings.fetch.timeout_seconds = timeout;
        }
        if self.render {
            settings.fetch.mode = FetchMode::Rendered;
        }
        if self.no_headless {
            settings.fetch.headless = false;
        }
        if self.no_timestamp {
            settings.output.timestamped = false;
        }
    }
}

/// Rejects origins without an http(s) scheme at parse time
fn origin_arg(raw: &str) -> Result<String, ConfigError> {
    validate_origin(raw).map(|_| raw.trim().to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut settings = match &cli.config {
        Some(path) => {
            tracing::info!("Loading settings from: {}", path.display());
            load_settings(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?
        }
        None => Settings::default(),
    };
    cli.apply_overrides(&mut settings);

    let config = CrawlConfig::from_settings(&cli.origin, cli.output.clone(), &settings)
        .context("Invalid settings")?;

    let backend = FetchBackend::from_settings(&config.fetch)
        .await
        .context("Failed to initialize fetch backend")?;

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    let sink = Box::new(CsvSink::new(config.output.clone()));
    let report = Coordinator::new(config, backend, sink, cancel)
        .run()
        .await
        .context("Crawl failed")?;

    tracing::debug!(
        "Run ended {} with {} records",
        report.state,
        report.records_saved
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_ledger=info,warn"),
            1 => EnvFilter::new("site_ledger=debug,info"),
            2 => EnvFilter::new("site_ledger=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Cancels the token on Ctrl+C or SIGTERM
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("Interrupted, saving collected results...");
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
