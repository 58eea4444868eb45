use scraper::{ElementRef, Html};
use url::Url;

use super::{normalize_whitespace, Candidate, ExtractionStrategy};

/// Elements whose text never counts as page content.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "svg", "nav",
];

/// Last-resort strategy: strip every tag and keep the visible text.
///
/// Never declines. On a page with no visible text the candidate body is
/// empty, which the chain records as low-confidence content rather than a
/// failure.
pub struct PlainTextStrategy;

impl ExtractionStrategy for PlainTextStrategy {
    fn name(&self) -> &'static str {
        "plain_text"
    }

    fn extract(&self, html: &str, _url: &Url) -> Option<Candidate> {
        let document = Html::parse_document(html);
        let body = visible_text(document.root_element());

        Some(Candidate { title: None, body })
    }
}

/// Collects the visible text beneath an element, skipping markup-only
/// subtrees, and normalizes whitespace.
pub(crate) fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect(element, &mut out);
    normalize_whitespace(&out)
}

fn collect(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIPPED_ELEMENTS.contains(&child_element.value().name()) {
                collect(child_element, out);
            }
        }
    }
}
