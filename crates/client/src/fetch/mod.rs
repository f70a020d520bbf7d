//! HTTP fetch client behind the `Network` trait.
//!
//! The worker only ever issues GET requests, and it needs failures split
//! the way the fetch policy splits them: a transport-level failure (no
//! connectivity, timeout, truncated body) is an `Err`, while any HTTP
//! status — including errors — is an `Ok` response handed back to the
//! caller unmodified.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, Url};
use std::time::{Duration, Instant};

use ember_core::Error;

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "ember/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "ember/0.1".to_string(),
            timeout: Duration::from_millis(20_000),
            max_redirects: 5,
        }
    }
}

impl From<&ember_core::WorkerConfig> for FetchConfig {
    fn from(config: &ember_core::WorkerConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers as name/value pairs
    pub headers: Vec<(String, String)>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

/// Seam between the worker and the wire.
///
/// Implemented by [`NetworkClient`] for production and by in-memory fakes
/// in worker tests.
#[async_trait]
pub trait Network: Send + Sync {
    /// Issue a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] only for transport-level failures; HTTP
    /// error statuses are `Ok`.
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error>;
}

/// reqwest-backed [`Network`] implementation.
pub struct NetworkClient {
    http: Client,
    config: FetchConfig,
}

impl NetworkClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Network for NetworkClient {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| Error::Network(format!("request failed: {e}")))?;

        let status = response.status();
        let headers = snapshot_headers(response.headers());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response body: {e}")))?;

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, status, fetch_ms, bytes.len());

        Ok(FetchResponse { url: url.clone(), status, headers, bytes, fetch_ms })
    }
}

/// Flatten a header map into storable name/value pairs.
///
/// Values that aren't valid UTF-8 are skipped.
fn snapshot_headers(headers: &reqwest::header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), value.to_string()))
        })
        .collect()
}
