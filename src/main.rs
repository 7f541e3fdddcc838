//! zoomdl-rs: downloads the cloud recordings of every user on a Zoom account.
//!
//! Users are enumerated page by page, each user's recordings are listed in
//! 30-day windows, and every file of every session is streamed to disk. A
//! session is written to an append-only completion log once it has fully
//! downloaded, so reruns pick up only what is new or previously failed.

#![warn(clippy::all)]

mod cli;
mod config;
mod dates;
mod download;
mod ledger;
pub mod retry;
mod shutdown;
mod sync;
mod types;
mod zoom;

use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Command;
use ledger::{FileLedger, Ledger, MemoryLedger};
use zoom::ApiError;

/// Run the status command.
async fn run_status(args: cli::StatusArgs) -> anyhow::Result<()> {
    let path = config::expand_tilde(&args.completed_log);

    if !path.exists() {
        println!("No completion log found at {}", path.display());
        println!("Run a sync first to create it.");
        return Ok(());
    }

    let completed = FileLedger::new(&path).load().await?;
    println!("Completion log: {}", path.display());
    println!("  Completed sessions: {}", completed.len());
    Ok(())
}

async fn run_sync(args: cli::SyncArgs) -> anyhow::Result<()> {
    let config = config::Config::from_cli(args)?;
    tracing::debug!(?config, "Resolved configuration");
    tracing::info!(
        "Starting zoomdl-rs: {} to {}",
        config.windows.start(),
        config.windows.end()
    );

    let shutdown_token = shutdown::install_signal_handler()?;

    let session = zoom::ZoomSession::new(&config.api_base, &config.token, config.timeouts())?;
    let transfer = download::HttpTransfer::new(
        session.download_client(),
        config.retry(),
        config.no_progress_bar,
    );
    let file_ledger = FileLedger::new(&config.completed_log);
    tracing::info!("Completion log: {}", file_ledger.path().display());
    let ledger: Box<dyn Ledger> = if config.dry_run {
        Box::new(MemoryLedger::with_entries(file_ledger.load().await?))
    } else {
        Box::new(file_ledger)
    };
    let sync_config = config.sync_config();

    let started = Instant::now();
    let summary = match sync::run_sync(
        &session,
        ledger.as_ref(),
        &transfer,
        &sync_config,
        &shutdown_token,
    )
    .await
    {
        Ok(summary) => summary,
        Err(e) => {
            if let Some(ApiError::Unauthorized { status }) = e.downcast_ref::<ApiError>() {
                anyhow::bail!(
                    "The API token was rejected or has expired (HTTP {}). \
                     Generate a new token and try again.",
                    status
                );
            }
            return Err(e);
        }
    };
    summary.log(&sync_config, started.elapsed());

    if summary.has_failures() {
        anyhow::bail!("{}", summary.failure_message(sync_config.policy));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    match cli.command {
        Command::Status(args) => run_status(args).await,
        Command::Sync(args) => run_sync(args).await,
    }
}
