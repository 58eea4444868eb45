//! Configuration module for Gleaner
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus JSON seed files. Every configuration field has a default, so
//! runs work without a file at all.
//!
//! # Example
//!
//! ```no_run
//! use gleaner::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gleaner.toml")).unwrap();
//! println!("Crawler will discover links to depth: {}", config.crawler.discover_depth);
//! ```

mod parser;
mod seeds;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, ExtractionConfig, FetcherConfig, OutputConfig, PolitenessConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{config_digest, load_config, load_config_or_default};

// Re-export seed handling
pub use seeds::{load_seeds, Seed};

// Re-export validation
pub use validation::validate;
