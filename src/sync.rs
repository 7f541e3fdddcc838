//! The sync run: enumerate users, list their recordings, download every
//! session the ledger has not seen yet, and record the ones that finished.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::dates::DateWindows;
use crate::download::paths::format_start_time;
use crate::download::{FileTransfer, SessionDownloader, SessionOutcome};
use crate::ledger::Ledger;
use crate::retry::RetryConfig;
use crate::types::CompletionPolicy;
use crate::zoom::{self, ApiSession};

/// Subset of application config consumed by the sync driver.
/// Decoupled from CLI parsing so the driver can be tested independently.
pub struct SyncConfig {
    pub(crate) directory: PathBuf,
    pub(crate) token: String,
    pub(crate) windows: DateWindows,
    pub(crate) policy: CompletionPolicy,
    pub(crate) retry: RetryConfig,
    pub(crate) dry_run: bool,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("directory", &self.directory)
            .field("token", &"<redacted>")
            .field("windows", &self.windows)
            .field("policy", &self.policy)
            .field("retry", &self.retry)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub users: usize,
    pub sessions_listed: usize,
    /// Sessions skipped because the ledger already had them.
    pub already_synced: usize,
    pub completed: usize,
    /// Sessions left unmarked, to be retried in full next run.
    pub not_complete: usize,
    pub files_downloaded: usize,
    pub files_failed: usize,
    pub files_incomplete: usize,
    pub files_planned: usize,
    pub bytes: u64,
    pub interrupted: bool,
}

impl SyncSummary {
    fn absorb(&mut self, outcome: &SessionOutcome) {
        self.files_downloaded += outcome.downloaded;
        self.files_failed += outcome.failed;
        self.files_incomplete += outcome.incomplete;
        self.files_planned += outcome.planned;
        self.bytes += outcome.bytes;
    }

    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }

    /// Exit message for a run with failed transfers. Under `AnyFile` a
    /// session that still fetched one file is recorded, so its failed files
    /// are not fetched again.
    pub fn failure_message(&self, policy: CompletionPolicy) -> String {
        match policy {
            CompletionPolicy::AllFiles => format!(
                "{} downloads failed; their sessions will be retried on the next run",
                self.files_failed
            ),
            CompletionPolicy::AnyFile => format!(
                "{} downloads failed; sessions that downloaded at least one file were \
                 recorded anyway and their failed files will not be retried",
                self.files_failed
            ),
        }
    }

    pub fn log(&self, config: &SyncConfig, elapsed: Duration) {
        if config.dry_run {
            tracing::info!("── Dry Run Summary ──");
            tracing::info!(
                "  {} files would be downloaded from {} sessions ({} already synced)",
                self.files_planned,
                self.sessions_listed - self.already_synced,
                self.already_synced
            );
            tracing::info!("  destination: {}", config.directory.display());
            return;
        }

        tracing::info!("── Summary ──");
        tracing::info!(
            "  {} users, {} sessions listed, {} already synced",
            self.users,
            self.sessions_listed,
            self.already_synced
        );
        tracing::info!(
            "  {} sessions completed, {} left for the next run",
            self.completed,
            self.not_complete
        );
        tracing::info!(
            "  {} files downloaded ({}), {} failed, {} still processing upstream",
            self.files_downloaded,
            format_bytes(self.bytes),
            self.files_failed,
            self.files_incomplete
        );
        tracing::info!("  saved under: {}", config.directory.display());
        tracing::info!("  elapsed: {}", format_duration(elapsed));
        if self.interrupted {
            tracing::warn!("  Interrupted before the run finished; rerun to continue");
        }
    }
}

/// Run one full sync pass.
///
/// Fatal errors (a rejected token, an unreadable listing, a ledger write
/// failure, an uncreatable directory) are returned; per-file transfer
/// failures only show up in the summary. On shutdown the pass stops between
/// files and returns the summary with `interrupted` set.
pub async fn run_sync(
    api: &dyn ApiSession,
    ledger: &dyn Ledger,
    transfer: &dyn FileTransfer,
    config: &SyncConfig,
    shutdown: &CancellationToken,
) -> Result<SyncSummary> {
    let mut completed = ledger.load().await?;
    tracing::debug!("Ledger holds {} completed sessions", completed.len());

    let identities = zoom::list_identities(api, &config.retry).await?;
    tracing::info!("Found {} users", identities.len());

    let downloader =
        SessionDownloader::new(transfer, &config.directory, &config.token, config.dry_run);
    let mut summary = SyncSummary::default();

    'users: for identity in &identities {
        if shutdown.is_cancelled() {
            summary.interrupted = true;
            break;
        }
        summary.users += 1;

        tracing::info!(
            "Listing recordings for {} between {} and {}",
            identity,
            config.windows.start(),
            config.windows.end()
        );
        let sessions = zoom::list_sessions(api, identity, &config.windows, &config.retry).await?;
        tracing::info!("  {} recording sessions", sessions.len());

        for (index, session) in sessions.iter().enumerate() {
            if shutdown.is_cancelled() {
                tracing::info!("Shutdown requested, stopping before the next session");
                summary.interrupted = true;
                break 'users;
            }
            summary.sessions_listed += 1;

            if completed.contains(&session.uuid) {
                tracing::debug!("Skipping {} (already synced)", session.uuid);
                summary.already_synced += 1;
                continue;
            }

            tracing::info!(
                "==> Session {} of {}: {} ({})",
                index + 1,
                sessions.len(),
                session.topic,
                format_start_time(&session.start_time)
            );
            let outcome = downloader.download_session(session, shutdown).await?;
            summary.absorb(&outcome);

            if outcome.interrupted {
                summary.interrupted = true;
                break 'users;
            }
            if config.dry_run {
                continue;
            }

            if outcome.is_complete(config.policy) {
                ledger.record(&session.uuid).await?;
                completed.insert(session.uuid.clone());
                summary.completed += 1;
            } else {
                tracing::warn!(
                    "Session {} not complete; it will be retried on the next run",
                    session.uuid
                );
                summary.not_complete += 1;
            }
        }
    }

    Ok(summary)
}

fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {:02}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

fn format_bytes(bytes: u64) -> String {
    indicatif::HumanBytes(bytes).to_string()
}
