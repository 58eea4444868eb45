use crate::url::canonicalize;
use crate::SeedError;
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// A crawl starting point
///
/// Seeds enter the frontier at depth 0 and are exempt from the domain policy.
/// A per-seed `max_depth` overrides the configured discover depth for the
/// whole subtree discovered from that seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub url: Url,
    pub max_depth: Option<u32>,
}

/// One entry in a seed file: a bare URL string or an object with overrides
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedSpec {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        max_depth: Option<u32>,
    },
}

/// The two accepted seed file shapes: a bare array, or an object with a
/// `urls` key
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedFile {
    List(Vec<SeedSpec>),
    Object { urls: Vec<SeedSpec> },
}

/// Loads and canonicalizes seed URLs from a JSON file
///
/// # Arguments
///
/// * `path` - Path to the JSON seed file
///
/// # Returns
///
/// * `Ok(Vec<Seed>)` - Canonicalized seeds, in file order
/// * `Err(SeedError)` - Unreadable file, malformed JSON, empty list, or an
///   entry that is not a crawlable http(s) URL
pub fn load_seeds(path: &Path) -> Result<Vec<Seed>, SeedError> {
    let content = std::fs::read_to_string(path)?;
    let file: SeedFile = serde_json::from_str(&content)?;

    let specs = match file {
        SeedFile::List(specs) => specs,
        SeedFile::Object { urls } => urls,
    };

    if specs.is_empty() {
        return Err(SeedError::Empty);
    }

    specs.into_iter().map(seed_from_spec).collect()
}

/// Canonicalizes one parsed seed entry. Any URL a run cannot crawl is
/// rejected up front, before the run row is created.
fn seed_from_spec(spec: SeedSpec) -> Result<Seed, SeedError> {
    let (raw, max_depth) = match spec {
        SeedSpec::Url(raw) => (raw, None),
        SeedSpec::Detailed { url, max_depth } => (url, max_depth),
    };

    let url = canonicalize(&raw, None).map_err(|e| SeedError::InvalidUrl {
        url: raw,
        reason: e.to_string(),
    })?;

    Ok(Seed { url, max_depth })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_seed_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_bare_array() {
        let file = create_seed_file(r#"["https://example.com/", "https://other.org/docs"]"#);
        let seeds = load_seeds(file.path()).unwrap();

        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].url.as_str(), "https://example.com/");
        assert_eq!(seeds[0].max_depth, None);
        assert_eq!(seeds[1].url.as_str(), "https://other.org/docs");
    }

    #[test]
    fn test_load_object_form() {
        let file = create_seed_file(r#"{"urls": ["https://example.com/"]}"#);
        let seeds = load_seeds(file.path()).unwrap();

        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_load_detailed_entry_with_depth_override() {
        let file = create_seed_file(
            r#"[
                "https://example.com/",
                {"url": "https://deep.example.com/", "max_depth": 5}
            ]"#,
        );
        let seeds = load_seeds(file.path()).unwrap();

        assert_eq!(seeds[0].max_depth, None);
        assert_eq!(seeds[1].max_depth, Some(5));
    }

    #[test]
    fn test_detailed_entry_without_depth() {
        let file = create_seed_file(r#"[{"url": "https://example.com/"}]"#);
        let seeds = load_seeds(file.path()).unwrap();

        assert_eq!(seeds[0].max_depth, None);
    }

    #[test]
    fn test_seeds_are_canonicalized() {
        let file = create_seed_file(r#"["HTTPS://Example.COM:443/page/#intro"]"#);
        let seeds = load_seeds(file.path()).unwrap();

        assert_eq!(seeds[0].url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_empty_list_rejected() {
        let file = create_seed_file("[]");
        let result = load_seeds(file.path());
        assert!(matches!(result, Err(SeedError::Empty)));
    }

    #[test]
    fn test_empty_object_rejected() {
        let file = create_seed_file(r#"{"urls": []}"#);
        let result = load_seeds(file.path());
        assert!(matches!(result, Err(SeedError::Empty)));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let file = create_seed_file(r#"["ftp://example.com/file"]"#);
        let result = load_seeds(file.path());
        assert!(matches!(result, Err(SeedError::InvalidUrl { .. })));
    }

    #[test]
    fn test_unparseable_url_rejected() {
        let file = create_seed_file(r#"["not a url at all"]"#);
        let result = load_seeds(file.path());

        match result {
            Err(SeedError::InvalidUrl { url, .. }) => assert_eq!(url, "not a url at all"),
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_rejected() {
        let file = create_seed_file("this is not json");
        let result = load_seeds(file.path());
        assert!(matches!(result, Err(SeedError::Parse(_))));
    }

    #[test]
    fn test_missing_file_rejected() {
        let result = load_seeds(Path::new("/nonexistent/seeds.json"));
        assert!(matches!(result, Err(SeedError::Io(_))));
    }
}
