//! Gleaner: a polite breadth-first text crawler
//!
//! This crate crawls outward from seed URLs, extracts readable text through a
//! fallback chain of strategies, and upserts the results into a SQLite-backed
//! document corpus with a full-text index. Crawl state is durable, so an
//! interrupted run can be resumed.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod politeness;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for gleaner operations.
///
/// Only hard pre-run failures surface through this type; per-URL failures are
/// handled inside the crawl loop and never abort a run.
#[derive(Debug, Error)]
pub enum GleanerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Seed-file errors. These are fatal: a run never starts with bad seeds.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Seed file contains no URLs")]
    Empty,

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for gleaner operations
pub type Result<T> = std::result::Result<T, GleanerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, Seed};
pub use crawler::{CrawlController, CrawlSummary};
pub use extract::ExtractedContent;
pub use state::{EntryState, FailReason};
pub use url::{canonicalize, registrable_domain, DomainPolicy};
