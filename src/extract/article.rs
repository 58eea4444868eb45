use scraper::{Html, Selector};
use url::Url;

use super::plaintext::visible_text;
use super::{Candidate, ExtractionStrategy};

/// Containers that conventionally hold the main article, in priority order.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".post-body",
    "#content",
    ".content",
];

/// Secondary strategy: scan for conventional article containers.
///
/// Takes the text of the first matching container. Declines when the page
/// uses none of the conventional markup, leaving it to the tag-stripping
/// fallback.
pub struct ArticleScanStrategy {
    selectors: Vec<Selector>,
}

impl ArticleScanStrategy {
    pub fn new() -> Self {
        let selectors = CONTENT_SELECTORS
            .iter()
            .filter_map(|css| Selector::parse(css).ok())
            .collect();

        Self { selectors }
    }
}

impl Default for ArticleScanStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for ArticleScanStrategy {
    fn name(&self) -> &'static str {
        "article_scan"
    }

    fn extract(&self, html: &str, _url: &Url) -> Option<Candidate> {
        let document = Html::parse_document(html);

        for selector in &self.selectors {
            let Some(element) = document.select(selector).next() else {
                continue;
            };

            let body = visible_text(element);
            if !body.is_empty() {
                return Some(Candidate { title: None, body });
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_article_tag_found() {
        let html = r#"
            <html><body>
                <nav>Menu items</nav>
                <article><p>The article body text.</p></article>
                <footer>Footer</footer>
            </body></html>
        "#;

        let candidate = ArticleScanStrategy::new().extract(html, &url()).unwrap();
        assert_eq!(candidate.body, "The article body text.");
    }

    #[test]
    fn test_selector_priority_order() {
        let html = r#"
            <html><body>
                <div id="content">Div content text</div>
                <article>Article text wins</article>
            </body></html>
        "#;

        let candidate = ArticleScanStrategy::new().extract(html, &url()).unwrap();
        assert_eq!(candidate.body, "Article text wins");
    }

    #[test]
    fn test_content_id_fallback() {
        let html = r#"<html><body><div id="content"><p>Main text here</p></div></body></html>"#;

        let candidate = ArticleScanStrategy::new().extract(html, &url()).unwrap();
        assert_eq!(candidate.body, "Main text here");
    }

    #[test]
    fn test_declines_without_known_containers() {
        let html = "<html><body><p>Loose paragraphs only</p></body></html>";
        assert!(ArticleScanStrategy::new().extract(html, &url()).is_none());
    }

    #[test]
    fn test_declines_on_empty_container() {
        let html = "<html><body><article>   </article></body></html>";
        assert!(ArticleScanStrategy::new().extract(html, &url()).is_none());
    }
}
