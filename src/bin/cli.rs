//! KAMS watcher CLI
//!
//! Local execution entry point, meant to be invoked from cron or a scheduler.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use kams_watch::{
    auth::EnvSecrets,
    error::Result,
    models::{Config, StoreBackend},
    pipeline::{RunOrchestrator, RunOutcome},
    services::{ListingFetcher, ListingSource, PostExtractor},
};

/// kams-watch - KAMS announcement watcher
#[derive(Parser, Debug)]
#[command(
    name = "kams-watch",
    version,
    about = "Watches the KAMS support-program listing and mails new announcements"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run once: fetch, record new posts and send the notification
    Run {
        /// Exit with status 1 when the run fails
        #[arg(long)]
        exit_code: bool,
    },

    /// Fetch and extract the listing, print posts as JSON, write nothing
    Peek,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging; `--verbose` wins over the configured level.
fn init_logging(verbose: bool, config_path: &Path) {
    let level = if verbose {
        "debug".to_string()
    } else {
        Config::load(config_path)
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "info".to_string())
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose, &cli.config);

    let config = Config::load_or_default(&cli.config);
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Run { exit_code } => {
            config.validate()?;

            let orchestrator = RunOrchestrator::from_config(&config, Arc::new(EnvSecrets))?;
            let outcome = orchestrator.run().await;

            if let RunOutcome::Failed { stage, recorded, .. } = &outcome {
                log::warn!("Run ended in failure while {stage} (error row: {recorded:?})");
                if exit_code {
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Command::Peek => {
            let fetcher = ListingFetcher::new(&config)?;
            let extractor = PostExtractor::new(&config.source)?;

            let document = fetcher.fetch().await?;
            let posts = extractor.extract(&document)?;
            log::info!("Extracted {} post(s) from {}", posts.len(), document.url);

            println!("{}", serde_json::to_string_pretty(&posts)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            log::info!("Listing: {}", config.source.listing_url());
            log::info!("URL join: {:?}", config.source.url_join);
            match config.store.backend {
                StoreBackend::GoogleSheets => {
                    log::info!("Store: Google Sheets {}", config.store.store_id)
                }
                StoreBackend::Local => {
                    log::info!("Store: local {}", config.store.local_dir.display())
                }
            }
            log::info!(
                "Ranges: records {}, titles {}, errors {}",
                config.store.data_range_name,
                config.store.title_range_name,
                config.store.error_range_name
            );
            log::info!(
                "Mail: {} -> {} via {}:{}",
                config.mail.sender,
                config.mail.recipient,
                config.mail.smtp_host,
                config.mail.smtp_port
            );
            log::info!("✓ Config OK");
        }
    }

    Ok(ExitCode::SUCCESS)
}
