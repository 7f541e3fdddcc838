use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};
use reqwest::Client;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

use super::error::DownloadError;
use super::paths;
use crate::retry::{self, RetryAction, RetryConfig};

/// Write granularity for media files.
pub const CHUNK_SIZE: usize = 32 * 1024;

const PART_SUFFIX: &str = ".part";

/// Moves one remote file to a local path. Implemented over HTTP by
/// [`HttpTransfer`]; the orchestrator only sees this trait.
#[async_trait]
pub trait FileTransfer: Send + Sync {
    /// Download `url` to `destination`, returning the number of bytes written.
    /// The parent directory already exists.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, DownloadError>;
}

/// Append the access token Zoom requires on recording download links.
pub fn authenticated_url(download_url: &str, token: &str) -> Result<String, DownloadError> {
    let mut url = url::Url::parse(download_url).map_err(|source| DownloadError::Url {
        url: download_url.to_string(),
        source,
    })?;
    url.query_pairs_mut().append_pair("access_token", token);
    Ok(url.into())
}

/// Temp file next to `destination`, kept within the component length limit.
fn part_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = paths::truncate_utf8(&name, 255 - PART_SUFFIX.len());
    destination.with_file_name(format!("{}{}", stem, PART_SUFFIX))
}

fn byte_progress_bar(no_progress_bar: bool, total: Option<u64>) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total.unwrap_or(0)).with_finish(ProgressFinish::AndClear);
    let template = if total.is_some() {
        "  [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})"
    } else {
        "  [{elapsed_precise}] {bytes} ({bytes_per_sec})"
    };
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

/// Streaming HTTP transfer with per-file retries.
///
/// Each attempt writes a fresh `.part` file and renames it into place only
/// after the body has been fully written, so a finished-looking file is
/// always complete. A failed attempt's `.part` is left behind and truncated
/// by the next one.
pub struct HttpTransfer {
    client: Client,
    retry: RetryConfig,
    no_progress_bar: bool,
}

impl HttpTransfer {
    pub fn new(client: Client, retry: RetryConfig, no_progress_bar: bool) -> Self {
        Self {
            client,
            retry,
            no_progress_bar,
        }
    }

    async fn attempt(&self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
        let path_str = destination.display().to_string();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::Http {
                source: e,
                path: path_str.clone(),
                bytes_written: 0,
            })?;

        if !response.status().is_success() {
            return Err(DownloadError::HttpStatus {
                status: response.status().as_u16(),
                path: path_str,
            });
        }

        let part = part_path(destination);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&part)
            .await?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);

        let pb = byte_progress_bar(self.no_progress_bar, response.content_length());
        let mut bytes_written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    pb.suspend(|| {
                        tracing::warn!(
                            "Transfer of {} interrupted after {} bytes: {}",
                            path_str,
                            bytes_written,
                            e
                        );
                    });
                    return Err(DownloadError::Http {
                        source: e,
                        path: path_str,
                        bytes_written,
                    });
                }
            };
            writer.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
            pb.set_position(bytes_written);
        }
        writer.flush().await?;
        writer.into_inner().sync_all().await?;
        pb.finish_and_clear();

        fs::rename(&part, destination).await?;
        Ok(bytes_written)
    }
}

#[async_trait]
impl FileTransfer for HttpTransfer {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
        let what = format!("Download of {}", destination.display());
        let result = retry::retry_with_backoff(
            &self.retry,
            &what,
            |e: &DownloadError| {
                if e.is_retryable() {
                    RetryAction::Retry
                } else {
                    RetryAction::Abort
                }
            },
            || self.attempt(url, destination),
        )
        .await;

        result.map_err(|e| {
            if e.is_retryable() && self.retry.max_retries > 0 {
                DownloadError::RetriesExhausted {
                    retries: self.retry.max_retries,
                    path: destination.display().to_string(),
                    last_error: e.to_string(),
                }
            } else {
                e
            }
        })
    }
}
