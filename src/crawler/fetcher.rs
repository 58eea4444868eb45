//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with a descriptive user agent string
//! - GET requests with bounded redirect following
//! - Content-Type screening, so only textual documents reach extraction
//! - Retry logic for transient failures
//! - Error classification into the crawl's failure taxonomy

use crate::config::{Config, FetcherConfig};
use crate::politeness::RateLimiter;
use crate::state::FailReason;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;
use url::Url;

/// Why a fetch failed
///
/// Transient variants are retried within the run; every variant maps onto a
/// [`FailReason`] when it is finally given up on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Hostname did not resolve
    #[error("dns lookup failed: {0}")]
    Dns(String),

    /// Connection refused, reset, or failed mid-transfer
    #[error("connection failed: {0}")]
    Connection(String),

    /// Server answered with a non-success status
    #[error("http status {status}")]
    Http { status: u16 },

    /// Response is not a textual document
    #[error("unsupported content type '{0}'")]
    ContentType(String),
}

impl FetchError {
    /// Returns true when retrying within the same run may help.
    ///
    /// Timeouts, connection trouble, and server errors are transient; client
    /// errors, DNS failures, and wrong content types are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Connection(_) => true,
            Self::Http { status } => *status >= 500,
            Self::Dns(_) | Self::ContentType(_) => false,
        }
    }

    /// The failure reason recorded on the frontier entry
    pub fn fail_reason(&self) -> FailReason {
        match self {
            Self::Timeout => FailReason::Timeout,
            Self::Dns(_) => FailReason::Dns,
            Self::Connection(_) => FailReason::Connection,
            Self::Http { status } => FailReason::Http(*status),
            Self::ContentType(_) => FailReason::ContentType,
        }
    }
}

/// A successfully fetched page
#[derive(Debug)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: Url,
    /// Final URL after redirects; links resolve against this
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Decoded page body
    pub body: String,
}

/// Retry schedule for transient failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries attempted after the first failure
    pub max_retries: u32,
    /// Delay before the first retry; doubles per attempt
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay(),
        }
    }

    /// Backoff before retry number `attempt` (zero-based)
    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Builds the shared HTTP client
///
/// Redirects are followed up to 10 hops; the chain's final URL is reported on
/// the fetched page so relative links resolve correctly.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    Client::builder()
        .user_agent(config.user_agent_string())
        .timeout(config.fetcher.request_timeout())
        .connect_timeout(config.fetcher.connect_timeout())
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited page fetcher with retry
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Fetches a page, retrying transient failures with exponential backoff.
    ///
    /// The rate limiter is re-acquired before every attempt, so retries count
    /// against the site's budget like any other request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `limiter` - Per-site rate limiter
    /// * `crawl_delay` - Crawl-delay advertised by the site's robots.txt
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - The decoded page
    /// * `Err(FetchError)` - Classified failure after retries are exhausted
    pub async fn fetch(
        &self,
        url: &Url,
        limiter: &RateLimiter,
        crawl_delay: Option<Duration>,
    ) -> Result<FetchedPage, FetchError> {
        let site = url.authority().to_string();
        let mut attempt = 0;

        loop {
            limiter.acquire(&site, crawl_delay).await;

            match self.fetch_once(url).await {
                Ok(page) => return Ok(page),
                Err(error) if error.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    attempt += 1;
                    warn!(
                        url = %url,
                        %error,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient fetch failure, retrying"
                    );
                    sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// One GET attempt: status check, content-type screen, body decode
    async fn fetch_once(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_textual(&content_type) {
            return Err(FetchError::ContentType(content_type));
        }

        let body = response.text().await.map_err(classify_error)?;

        Ok(FetchedPage {
            url: url.clone(),
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}

/// Accepts HTML and other textual documents.
///
/// A missing Content-Type header is treated as HTML, which is what servers
/// that omit it almost always serve.
fn is_textual(content_type: &str) -> bool {
    if content_type.is_empty() {
        return true;
    }

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    mime == "application/xhtml+xml" || mime.starts_with("text/")
}

/// Classifies a transport error.
///
/// DNS failures surface inside connect errors, so the source chain is checked
/// for resolver messages before the generic connect classification.
fn classify_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        return FetchError::Timeout;
    }

    let text = error_chain_text(&error);
    if text.contains("dns")
        || text.contains("failed to lookup")
        || text.contains("name or service not known")
    {
        return FetchError::Dns(text);
    }

    FetchError::Connection(text)
}

/// Flattens an error and its sources into one lowercase string
fn error_chain_text(error: &(dyn std::error::Error + 'static)) -> String {
    let mut text = error.to_string().to_ascii_lowercase();
    let mut source = error.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string().to_ascii_lowercase());
        source = inner.source();
    }
    text
}
