//! Content extraction module
//!
//! Readable text is pulled out of fetched HTML by a chain of strategies tried
//! in priority order: readability-based article extraction first, a scan of
//! common article containers second, and whole-document tag stripping as the
//! last resort. A strategy either produces a candidate or declines; the chain
//! accepts the first candidate that meets the configured minimum length. The
//! last strategy never declines, so every fetched page yields something, but
//! its output is marked low-confidence.

mod article;
mod plaintext;
mod readability;

pub use self::article::ArticleScanStrategy;
pub use self::plaintext::PlainTextStrategy;
pub use self::readability::ReadabilityStrategy;

use scraper::{Html, Selector};
use url::Url;

/// Raw output of a single strategy before the chain applies its threshold.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub title: Option<String>,
    pub body: String,
}

/// The content the chain settled on for a page.
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Page title, if any strategy or the document itself provided one
    pub title: Option<String>,
    /// Readable body text, whitespace-normalized
    pub body: String,
    /// Name of the strategy that produced the body
    pub strategy: &'static str,
    /// True when only the last-resort strategy produced content
    pub low_confidence: bool,
}

/// One algorithm in the fallback chain.
///
/// Returning `None` means the strategy declines: it found nothing useful on
/// this page. Declining is not an error.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, html: &str, url: &Url) -> Option<Candidate>;
}

/// Ordered fallback chain of extraction strategies.
pub struct StrategyChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    min_content_length: usize,
}

impl StrategyChain {
    /// Builds the standard three-strategy chain.
    ///
    /// `min_content_length` is the acceptance threshold for everything except
    /// the last-resort strategy, which is accepted at any length.
    pub fn standard(min_content_length: usize) -> Self {
        Self::new(
            vec![
                Box::new(ReadabilityStrategy),
                Box::new(ArticleScanStrategy::new()),
                Box::new(PlainTextStrategy),
            ],
            min_content_length,
        )
    }

    /// Builds a chain from an explicit strategy list.
    ///
    /// The final strategy is treated as the guaranteed fallback: its output is
    /// accepted regardless of length and marked low-confidence.
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>, min_content_length: usize) -> Self {
        Self {
            strategies,
            min_content_length,
        }
    }

    /// Runs the chain over a fetched page.
    ///
    /// Returns `None` only if every strategy declines, which cannot happen in
    /// the standard chain.
    pub fn extract(&self, html: &str, url: &Url) -> Option<ExtractedContent> {
        let last = self.strategies.len().checked_sub(1)?;

        for (index, strategy) in self.strategies.iter().enumerate() {
            let Some(candidate) = strategy.extract(html, url) else {
                continue;
            };

            let is_fallback = index == last;
            if !is_fallback && candidate.body.chars().count() < self.min_content_length {
                // Below threshold counts as a decline for ranked strategies.
                continue;
            }

            let title = candidate.title.or_else(|| document_title(html));
            return Some(ExtractedContent {
                title,
                body: candidate.body,
                strategy: strategy.name(),
                low_confidence: is_fallback,
            });
        }

        None
    }
}

/// Collapses runs of whitespace into single spaces and trims the result.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title fallback: `<title>` first, then the first `<h1>`.
pub(crate) fn document_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for css in ["title", "h1"] {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = normalize_whitespace(&element.text().collect::<String>());
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    None
}
