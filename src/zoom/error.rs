use thiserror::Error;

/// Errors from the Zoom REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API token was rejected (HTTP {status}); it is invalid or has expired")]
    Unauthorized { status: u16 },

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Malformed API response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            ApiError::Http(e) => !e.is_decode() && !e.is_builder(),
            ApiError::Unauthorized { .. } | ApiError::Json(_) | ApiError::Url(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> ApiError {
        ApiError::HttpStatus {
            status,
            url: "https://api.zoom.us/v2/users".into(),
        }
    }

    #[test]
    fn test_rate_limit_and_server_errors_retryable() {
        assert!(status(429).is_retryable());
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
    }

    #[test]
    fn test_client_errors_not_retryable() {
        assert!(!status(400).is_retryable());
        assert!(!status(404).is_retryable());
    }

    #[test]
    fn test_unauthorized_never_retried() {
        assert!(!ApiError::Unauthorized { status: 401 }.is_retryable());
    }

    #[test]
    fn test_malformed_json_not_retryable() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!ApiError::Json(err).is_retryable());
    }
}
