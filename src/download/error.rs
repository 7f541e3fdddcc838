use thiserror::Error;

/// Typed transfer errors so the retry loop can tell transient failures
/// (rate limits, server errors, dropped connections) from permanent ones
/// (expired links, disk failures).
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP error {status} downloading {path}")]
    HttpStatus { status: u16, path: String },

    #[error("HTTP error downloading {path} (bytes_so_far={bytes_written}): {source}")]
    Http {
        source: reqwest::Error,
        path: String,
        bytes_written: u64,
    },

    #[error("Disk error: {0}")]
    Disk(#[from] std::io::Error),

    #[error("Invalid download URL {url}: {source}")]
    Url {
        url: String,
        source: url::ParseError,
    },

    #[error("Giving up on {path} after {retries} retries: {last_error}")]
    RetriesExhausted {
        retries: u32,
        path: String,
        last_error: String,
    },
}

impl DownloadError {
    /// Whether this error is transient and worth retrying.
    ///
    /// 401/403/404 mean the time-limited download link is no longer valid;
    /// only a fresh listing on the next run can fix that.
    pub fn is_retryable(&self) -> bool {
        match self {
            DownloadError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            DownloadError::Http { .. } => true,
            DownloadError::Disk(_)
            | DownloadError::Url { .. }
            | DownloadError::RetriesExhausted { .. } => false,
        }
    }
}
