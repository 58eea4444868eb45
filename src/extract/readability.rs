use std::io::Cursor;

use url::Url;

use super::{normalize_whitespace, Candidate, ExtractionStrategy};

/// Primary strategy: Mozilla-readability article extraction.
///
/// Scores the DOM for the main article node and strips boilerplate
/// (navigation, ads, footers). Declines when the algorithm errors out or
/// finds no text at all.
pub struct ReadabilityStrategy;

impl ExtractionStrategy for ReadabilityStrategy {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn extract(&self, html: &str, url: &Url) -> Option<Candidate> {
        let mut cursor = Cursor::new(html.as_bytes());
        let product = readability::extractor::extract(&mut cursor, url).ok()?;

        let body = normalize_whitespace(&product.text);
        if body.is_empty() {
            return None;
        }

        let title = normalize_whitespace(&product.title);
        let title = (!title.is_empty()).then_some(title);

        Some(Candidate { title, body })
    }
}
