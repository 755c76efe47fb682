//! HTTP client with retry and exponential backoff.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur during downloads.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server kept returning an error status after all retries.
    #[error("Server error: HTTP {status}")]
    ServerError {
        /// HTTP status code of the final attempt.
        status: u16,
    },
}

/// Retry policy for transient download failures.
///
/// The delay before retry `n` is `base_delay * multiplier^n`, so the
/// defaults wait 1, 2, and 4 seconds between the four attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts before giving up.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Factor applied to the delay after each retry.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Returns the backoff delay before retry number `retry`, 0-based.
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(self.multiplier.saturating_pow(retry))
    }
}

/// Configuration for the download client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
    /// User agent string sent with requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            user_agent: format!("stevenson/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client for the NCEI archive.
///
/// Retries transient failures per the configured [`RetryPolicy`]:
/// connect and timeout errors, HTTP 5xx, and HTTP 429. A 404 is not a
/// failure; it reports as "no file published" so callers can treat the
/// station as empty.
#[derive(Debug, Clone)]
pub struct DownloadClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl DownloadClient {
    /// Creates a new download client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(8)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_defaults() -> Result<Self, DownloadError> {
        Self::new(ClientConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Downloads a URL, retrying transient failures.
    ///
    /// Returns `Ok(None)` when the server reports 404, i.e. no file is
    /// published at that URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the request still fails after all retries
    /// or fails with a non-retryable status.
    pub async fn download(&self, url: &str) -> Result<Option<Bytes>, DownloadError> {
        let mut retries = 0;
        loop {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Ok(None);
                    }
                    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    {
                        if retries + 1 >= self.config.retry.max_attempts {
                            return Err(DownloadError::ServerError {
                                status: status.as_u16(),
                            });
                        }
                        let delay = self.config.retry.delay(retries);
                        tracing::debug!(
                            url,
                            status = status.as_u16(),
                            retry = retries + 1,
                            "retrying after server error"
                        );
                        retries += 1;
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    let response = response.error_for_status()?;
                    return Ok(Some(response.bytes().await?));
                }
                Err(e) if is_retryable(&e) && retries + 1 < self.config.retry.max_attempts => {
                    let delay = self.config.retry.delay(retries);
                    tracing::debug!(
                        url,
                        error = %e,
                        retry = retries + 1,
                        "retrying after request error"
                    );
                    retries += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Connection-level failures worth retrying; anything structural, like
/// a builder or redirect error, fails immediately.
fn is_retryable(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}
