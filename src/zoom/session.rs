use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::error::ApiError;

pub const DEFAULT_API_BASE: &str = "https://api.zoom.us/v2";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Minimal authenticated transport used by the user and recording listers.
/// The concrete implementation is [`ZoomSession`]; tests substitute a fake.
#[async_trait]
pub trait ApiSession: Send + Sync {
    /// GET `path` (relative to the API base) and decode the JSON body.
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError>;
}

/// Network timeouts applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    /// Whole-request limit for API calls, and the per-read stall limit for
    /// downloads (whose total duration is unbounded).
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            request: Duration::from_secs(300),
        }
    }
}

/// Bearer-token session against the Zoom REST API.
pub struct ZoomSession {
    client: Client,
    api_base: String,
    request_timeout: Duration,
}

impl std::fmt::Debug for ZoomSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoomSession")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ZoomSession {
    pub fn new(api_base: &str, token: &str, timeouts: Timeouts) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| anyhow::anyhow!("API token contains characters not allowed in a header"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.request)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            request_timeout: timeouts.request,
        })
    }

    /// Client for media downloads, sharing the connection pool and timeouts.
    ///
    /// Download URLs authenticate through the `access_token` query parameter,
    /// so the bearer header this client also carries is harmless.
    pub fn download_client(&self) -> Client {
        self.client.clone()
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<url::Url, ApiError> {
        let raw = format!("{}/{}", self.api_base, path.trim_start_matches('/'));
        Ok(url::Url::parse_with_params(&raw, query)?)
    }
}

#[async_trait]
impl ApiSession for ZoomSession {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = self.endpoint(path, query)?;
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(url.clone())
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
