// src/main.rs

//! leadscout CLI
//!
//! `serve` exposes the HTTP job surface; `run` executes a single lead run
//! from the terminal; `validate` sanity-checks the configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use leadscout::config::Config;
use leadscout::error::Result;
use leadscout::exports::ExportStore;
use leadscout::pipeline::{run_pipeline, JobRequest};
use leadscout::render::ChromeRenderer;
use leadscout::server;

/// leadscout - business lead discovery and contact enrichment
#[derive(Parser, Debug)]
#[command(name = "leadscout", version, about = "Lead discovery and contact enrichment")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "leadscout.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP job-control server
    Serve {
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one lead discovery job and exit
    Run {
        /// Search term for the results feed
        query: String,

        /// Number of listings to collect
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,

        /// Mine homepages only, skip internal contact/about pages
        #[arg(long)]
        skip_internal_pages: bool,

        /// Override the export directory
        #[arg(long)]
        output_dir: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    config.validate()?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(config).await?;
        }

        Command::Run {
            query,
            count,
            skip_internal_pages,
            output_dir,
        } => {
            let exports_dir = output_dir.unwrap_or_else(|| config.server.exports_dir.clone());
            let store = ExportStore::new(exports_dir);
            let renderer = ChromeRenderer::new(config.crawler.clone(), config.browser.clone());

            let request = JobRequest {
                query,
                target_count: count,
                visit_internal_pages: !skip_internal_pages,
            };
            let summary = run_pipeline(&config, &renderer, &store, &request).await?;

            log::info!(
                "Done: {} listings for {:?} in {}s -> {}",
                summary.listing_count,
                summary.query,
                (summary.finished_at - summary.started_at).num_seconds(),
                summary.export_file
            );
        }

        Command::Validate => {
            log::info!("Configuration OK: {}", cli.config.display());
        }
    }

    Ok(())
}
