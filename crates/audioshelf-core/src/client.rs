//! Rate-limited HTTP client shared by all source implementations.
//!
//! Every source owns one `SourceClient`; nothing is shared across
//! sources. The client spaces requests out to avoid hammering the sites
//! it scrapes and retries transient errors (429, 5xx) with exponential
//! backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use url::Url;

use crate::error::{Result, SourceError};

/// Default User-Agent mimicking a modern browser.
///
/// Scraped sites frequently reject requests with a default library agent.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Maximum number of retry attempts for transient errors
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Rate limiter to control request frequency.
///
/// Ensures that requests are spaced at least `min_interval` apart.
pub struct RateLimiter {
    /// Minimum interval between requests
    min_interval: Duration,
    /// Timestamp of the last request
    last_request: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second.
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = Duration::from_secs_f64(1.0 / requests_per_second);
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(Instant::now() - min_interval)),
        }
    }

    /// Acquire permission to make a request, waiting if necessary to
    /// respect the minimum interval.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();

        if elapsed < self.min_interval {
            let wait_time = self.min_interval - elapsed;
            sleep(wait_time).await;
        }

        *last = Instant::now();
    }

    /// Get the minimum interval between requests.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Configuration for a source's HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum requests per second (default: 2.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 2.0,
            timeout_secs: 10,
        }
    }
}

/// HTTP client with rate limiting and retry logic.
///
/// Redirects are followed (reqwest default) and requests carry a
/// browser-like User-Agent.
pub struct SourceClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    /// Rate limiter for request throttling
    rate_limiter: RateLimiter,
}

impl SourceClient {
    /// Create a new client with default configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let rate_limiter = RateLimiter::new(config.requests_per_second);

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Fetch a URL and return the response body as a string.
    ///
    /// # Errors
    /// - `SourceError::Http` - network or HTTP error after all retries
    /// - `SourceError::RateLimited` - server returned 429 after all retries
    /// - `SourceError::NotFound` - server returned 404
    pub async fn fetch_html(&self, url: &Url) -> Result<String> {
        let response = self.fetch_with_retry(url, &[], 0).await?;
        Ok(response.text().await?)
    }

    /// Fetch a URL with query parameters and deserialize the response
    /// body as JSON.
    pub async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.fetch_with_retry(url, query, 0).await?;
        Ok(response.json().await?)
    }

    /// Internal method to fetch with retry logic.
    fn fetch_with_retry<'a>(
        &'a self,
        url: &'a Url,
        query: &'a [(&'a str, &'a str)],
        attempt: u32,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<reqwest::Response>> + Send + 'a>>
    {
        Box::pin(async move {
            // Wait for rate limiter before making request
            self.rate_limiter.acquire().await;

            let mut request = self.client.get(url.clone());
            if !query.is_empty() {
                request = request.query(query);
            }
            let response = request.send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            // 404 is final, no retry
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(SourceError::NotFound(url.to_string()));
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if attempt < MAX_RETRIES {
                    let delay = backoff_delay(attempt);
                    sleep(delay).await;
                    return self.fetch_with_retry(url, query, attempt + 1).await;
                }
                return Err(SourceError::RateLimited);
            }

            if status.is_server_error() {
                if attempt < MAX_RETRIES {
                    let delay = backoff_delay(attempt);
                    sleep(delay).await;
                    return self.fetch_with_retry(url, query, attempt + 1).await;
                }
            }

            Err(SourceError::Http(
                response.error_for_status().unwrap_err(),
            ))
        })
    }
}

/// Exponential backoff delay for retry: 1s, 2s, 4s, ...
fn backoff_delay(attempt: u32) -> Duration {
    let delay_ms = BASE_RETRY_DELAY_MS * 2u64.pow(attempt);
    Duration::from_millis(delay_ms)
}
