use crate::UrlError;
use url::Url;

/// Canonicalizes a URL so that equivalent URLs dedupe to one form.
///
/// # Canonicalization Steps
///
/// 1. Resolve relative references against `base` (absolute input ignores it)
/// 2. Reject anything that is not http or https
/// 3. Lowercase scheme and host (the parser guarantees this)
/// 4. Drop default ports (80 for http, 443 for https)
/// 5. Collapse duplicate path slashes and remove the trailing slash
///    (the root path stays `/`)
/// 6. Strip the fragment
///
/// Query strings are kept verbatim: they can distinguish content.
///
/// # Arguments
///
/// * `raw` - The URL string to canonicalize
/// * `base` - Base URL for resolving relative references, if any
///
/// # Returns
///
/// * `Ok(Url)` - Canonical URL
/// * `Err(UrlError)` - Unparseable input or unsupported scheme
pub fn canonicalize(raw: &str, base: Option<&Url>) -> Result<Url, UrlError> {
    let mut url = match base {
        Some(base) => base.join(raw),
        None => Url::parse(raw),
    }
    .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    // The url crate already lowercases scheme and host, removes dot
    // segments, and omits default ports when serializing.
    let path = normalize_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    Ok(url)
}

/// Collapses duplicate slashes and strips the trailing slash (root excepted).
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url_passes_through() {
        let result = canonicalize("https://example.com/page", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_relative_resolved_against_base() {
        let base = Url::parse("https://example.com/blog/post").unwrap();
        let result = canonicalize("../about", Some(&base)).unwrap();
        assert_eq!(result.as_str(), "https://example.com/about");
    }

    #[test]
    fn test_root_relative_resolved_against_base() {
        let base = Url::parse("https://example.com/blog/post").unwrap();
        let result = canonicalize("/contact", Some(&base)).unwrap();
        assert_eq!(result.as_str(), "https://example.com/contact");
    }

    #[test]
    fn test_absolute_ignores_base() {
        let base = Url::parse("https://example.com/").unwrap();
        let result = canonicalize("https://other.com/x", Some(&base)).unwrap();
        assert_eq!(result.as_str(), "https://other.com/x");
    }

    #[test]
    fn test_fragment_stripped() {
        let result = canonicalize("https://example.com/page#section", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_query_kept() {
        let result = canonicalize("https://example.com/page?id=3&tab=a", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?id=3&tab=a");
    }

    #[test]
    fn test_default_port_removed() {
        let result = canonicalize("http://example.com:80/page", None).unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");

        let result = canonicalize("https://example.com:443/page", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_explicit_port_kept() {
        let result = canonicalize("http://example.com:8080/page", None).unwrap();
        assert_eq!(result.as_str(), "http://example.com:8080/page");
    }

    #[test]
    fn test_scheme_and_host_lowercased() {
        let result = canonicalize("HTTPS://EXAMPLE.COM/Page", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_trailing_slash_removed() {
        let result = canonicalize("https://example.com/page/", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_root_slash_kept() {
        let result = canonicalize("https://example.com/", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = canonicalize("https://example.com", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_duplicate_slashes_collapsed() {
        let result = canonicalize("https://example.com//a///b", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/a/b");
    }

    #[test]
    fn test_dot_segments_resolved() {
        let result = canonicalize("https://example.com/a/../b/./c", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn test_same_canonical_form_dedupes() {
        let a = canonicalize("https://example.com/page/#top", None).unwrap();
        let b = canonicalize("https://example.com:443/page", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = canonicalize("ftp://example.com/file", None);
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_rejects_malformed() {
        let result = canonicalize("http://", None);
        assert!(result.is_err());
    }

    #[test]
    fn test_relative_without_base_fails() {
        let result = canonicalize("/page", None);
        assert!(matches!(result, Err(UrlError::Parse(_))));
    }
}
