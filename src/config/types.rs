use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for Gleaner
///
/// Every field carries a default, so a missing file or a partial file still
/// yields a runnable configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub politeness: PolitenessConfig,
    pub fetcher: FetcherConfig,
    pub extraction: ExtractionConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

impl Config {
    /// The user agent string sent with every request and matched against
    /// robots.txt groups
    pub fn user_agent_string(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.user_agent.crawler_name,
            self.user_agent.crawler_version,
            self.user_agent.contact_url,
            self.user_agent.contact_email
        )
    }
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth to follow from seed URLs
    #[serde(rename = "discover-depth")]
    pub discover_depth: u32,

    /// Whether discovered links may leave the seed domains
    #[serde(rename = "allow-cross-domain")]
    pub allow_cross_domain: bool,

    /// Optional cap on the number of pages processed in one run
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u64>,

    /// Number of concurrent fetch workers
    #[serde(rename = "max-workers")]
    pub max_workers: u32,

    /// Optional wall-clock deadline for the run, in seconds
    #[serde(rename = "deadline-secs")]
    pub deadline_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            discover_depth: 2,
            allow_cross_domain: false,
            max_pages: None,
            max_workers: 4,
            deadline_secs: None,
        }
    }
}

/// Rate limiting and robots.txt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolitenessConfig {
    /// Minimum interval between requests to one site, in milliseconds
    #[serde(rename = "min-interval-ms")]
    pub min_interval_ms: u64,

    /// Requests allowed back to back before the interval applies
    pub burst: u32,

    /// Cap applied to robots.txt crawl-delay directives, in seconds
    #[serde(rename = "max-crawl-delay-secs")]
    pub max_crawl_delay_secs: u64,
}

impl PolitenessConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn max_crawl_delay(&self) -> Duration {
        Duration::from_secs(self.max_crawl_delay_secs)
    }
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 1000,
            burst: 1,
            max_crawl_delay_secs: 30,
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Total request timeout, in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout, in seconds
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Retries attempted after a transient failure
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base delay for exponential retry backoff, in milliseconds
    #[serde(rename = "retry-base-delay-ms")]
    pub retry_base_delay_ms: u64,
}

impl FetcherConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

/// Content extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum body length, in characters, for a ranked strategy's output to
    /// be accepted
    #[serde(rename = "min-content-length")]
    pub min_content_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_content_length: 200,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "Gleaner".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/gleaner".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite corpus database
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./gleaner.db".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_runnable() {
        let config = Config::default();
        assert_eq!(config.crawler.discover_depth, 2);
        assert!(!config.crawler.allow_cross_domain);
        assert_eq!(config.crawler.max_workers, 4);
        assert_eq!(config.politeness.min_interval_ms, 1000);
        assert_eq!(config.politeness.burst, 1);
        assert_eq!(config.extraction.min_content_length, 200);
        assert!(!config.output.database_path.is_empty());
    }

    #[test]
    fn test_user_agent_string_format() {
        let config = Config::default();
        let ua = config.user_agent_string();
        assert!(ua.starts_with("Gleaner/"));
        assert!(ua.contains("(+https://example.com/gleaner; crawler@example.com)"));
    }

    #[test]
    fn test_duration_helpers() {
        let config = Config::default();
        assert_eq!(config.politeness.min_interval(), Duration::from_secs(1));
        assert_eq!(config.politeness.max_crawl_delay(), Duration::from_secs(30));
        assert_eq!(config.fetcher.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.fetcher.retry_base_delay(), Duration::from_millis(500));
    }
}
