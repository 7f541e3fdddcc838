//! Download engine: turns one recording session into files on disk.
//!
//! Files are fetched one at a time in listing order. A failed transfer is
//! logged and counted but never stops the remaining files, and the
//! [`SessionOutcome`] decides afterwards whether the session may be marked
//! complete.

pub mod error;
pub mod file;
pub mod paths;

use std::path::Path;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

pub use error::DownloadError;
pub use file::{FileTransfer, HttpTransfer};

use crate::types::CompletionPolicy;
use crate::zoom::{FileDescriptor, RecordingSession};

/// Per-file tallies for one session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub downloaded: usize,
    pub failed: usize,
    /// Descriptors still being processed upstream.
    pub incomplete: usize,
    /// Files a dry run would have fetched.
    pub planned: usize,
    pub bytes: u64,
    /// Shutdown was requested before every file was attempted.
    pub interrupted: bool,
}

impl SessionOutcome {
    /// Whether the session may be written to the ledger under `policy`.
    pub fn is_complete(&self, policy: CompletionPolicy) -> bool {
        if self.interrupted || self.incomplete > 0 || self.downloaded == 0 {
            return false;
        }
        match policy {
            CompletionPolicy::AllFiles => self.failed == 0,
            CompletionPolicy::AnyFile => true,
        }
    }
}

/// Downloads the files of a session into `<directory>/<folder>/<filename>`.
pub struct SessionDownloader<'a> {
    transfer: &'a dyn FileTransfer,
    directory: &'a Path,
    token: &'a str,
    dry_run: bool,
}

impl<'a> SessionDownloader<'a> {
    pub fn new(
        transfer: &'a dyn FileTransfer,
        directory: &'a Path,
        token: &'a str,
        dry_run: bool,
    ) -> Self {
        Self {
            transfer,
            directory,
            token,
            dry_run,
        }
    }

    /// Fetch every available file of `session`.
    ///
    /// Only a failure to create the destination directory is returned as an
    /// error; transfer failures are folded into the outcome.
    pub async fn download_session(
        &self,
        session: &RecordingSession,
        shutdown: &CancellationToken,
    ) -> Result<SessionOutcome> {
        let mut outcome = SessionOutcome::default();
        let total = session.files.len();
        if session.has_incomplete_files() {
            tracing::info!(
                "Session {} is still processing upstream; its ready files are fetched now",
                session.uuid
            );
        }

        for (index, file) in session.files.iter().enumerate() {
            if shutdown.is_cancelled() {
                tracing::info!("Shutdown requested, stopping before {}", file.id);
                outcome.interrupted = true;
                break;
            }

            if file.is_incomplete() {
                tracing::warn!(
                    "  ({} of {}) {} is still processing upstream; session will be retried",
                    index + 1,
                    total,
                    file.id
                );
                outcome.incomplete += 1;
                continue;
            }

            let name = paths::derive_name(session, file);
            let destination = name.local_path(self.directory);

            if self.dry_run {
                tracing::info!("[DRY RUN] Would download {}", destination.display());
                outcome.planned += 1;
                continue;
            }

            if let Some(parent) = destination.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }

            tracing::info!(
                "  ({} of {}) Downloading {}: {}",
                index + 1,
                total,
                file.recording_type(),
                name.filename
            );
            match self.fetch(file, &destination).await {
                Ok(bytes) => {
                    tracing::debug!("Downloaded {} ({} bytes)", destination.display(), bytes);
                    outcome.downloaded += 1;
                    outcome.bytes += bytes;
                }
                Err(e) => {
                    tracing::error!("Download failed: {}: {}", destination.display(), e);
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }

    async fn fetch(&self, file: &FileDescriptor, destination: &Path) -> Result<u64, DownloadError> {
        let url = file::authenticated_url(&file.download_url, self.token)?;
        self.transfer.fetch(&url, destination).await
    }
}
