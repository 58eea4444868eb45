//! Link discovery from fetched pages
//!
//! Candidate links come from `<a href>` tags and the canonical `<link>`.
//! Each href is resolved against the page's final URL, canonicalized, and
//! screened: non-http(s) schemes, anchors, and obvious binary files never
//! reach the frontier.

use crate::url::canonicalize;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Path extensions that never hold crawlable text
const SKIPPED_EXTENSIONS: &[&str] = &[
    // Documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    // Images
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".ico",
    // Styles, scripts, and feeds
    ".css", ".js", ".json", ".xml", ".rss", ".atom",
    // Archives
    ".zip", ".tar", ".gz", ".rar", ".7z",
    // Media
    ".mp3", ".mp4", ".avi", ".mov", ".webm", ".wav",
    // Binaries
    ".exe", ".dmg", ".iso", ".bin",
];

/// Extracts followable links from an HTML page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that is not http(s) after resolution
/// - Paths ending in a known binary extension
///
/// **Note:** `rel="nofollow"` links ARE followed
///
/// Results are canonicalized and deduplicated, preserving page order.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page's final URL, for resolving relative links
///
/// # Returns
///
/// Canonical URLs found in the HTML, each at most once
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let mut push = |url: Url| {
        if seen.insert(url.to_string()) {
            links.push(url);
        }
    };

    // Links from <a> tags
    if let Ok(anchor_selector) = Selector::parse("a[href]") {
        for element in document.select(&anchor_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_link(href, base_url) {
                    push(url);
                }
            }
        }
    }

    // The canonical link, when present, is the page's preferred address
    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_link(href, base_url) {
                    push(url);
                }
            }
        }
    }

    links
}

/// Resolves one href to a canonical URL, or None if it should be excluded
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    // Skip special schemes
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Skip fragment-only links (same page anchors)
    if href.starts_with('#') {
        return None;
    }

    // Canonicalization also rejects non-http(s) schemes
    let url = canonicalize(href, Some(base_url)).ok()?;

    if has_skipped_extension(&url) {
        return None;
    }

    Some(url)
}

/// True when the URL path ends in an extension the crawler never fetches
fn has_skipped_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    SKIPPED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
