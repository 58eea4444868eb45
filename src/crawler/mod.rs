//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic and failure classification
//! - Link extraction from fetched pages
//! - The breadth-first, depth-layered frontier
//! - Overall crawl orchestration with bounded concurrency

mod controller;
mod fetcher;
mod frontier;
mod parser;

pub use controller::{crawl, CrawlController, CrawlSummary, StopCause};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, RetryPolicy};
pub use frontier::{EnqueueOutcome, Frontier, FrontierEntry};
pub use parser::extract_links;
