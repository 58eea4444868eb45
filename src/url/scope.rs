use std::collections::BTreeSet;
use url::Url;

/// Extracts the registrable domain of a URL for scope decisions.
///
/// The host is lowercased and a leading `www.` label is removed, so
/// `https://WWW.Example.com/x` and `https://example.com/y` compare equal.
/// IP-address hosts are returned as-is.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Some(String)` - The normalized domain
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use gleaner::url::registrable_domain;
///
/// let url = Url::parse("https://www.example.com/path").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://blog.example.com/path").unwrap();
/// assert_eq!(registrable_domain(&url), Some("blog.example.com".to_string()));
/// ```
pub fn registrable_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    let domain = host.strip_prefix("www.").unwrap_or(&host);
    Some(domain.to_string())
}

/// Decides whether discovered URLs are in scope for the crawl.
///
/// Seeds themselves are exempt: the policy applies only to links discovered
/// during the crawl, never to depth-0 entries.
#[derive(Debug, Clone)]
pub struct DomainPolicy {
    seed_domains: BTreeSet<String>,
    allow_cross_domain: bool,
}

impl DomainPolicy {
    /// Builds a policy from the seed URLs.
    pub fn new(seeds: &[Url], allow_cross_domain: bool) -> Self {
        let seed_domains = seeds.iter().filter_map(registrable_domain).collect();

        Self {
            seed_domains,
            allow_cross_domain,
        }
    }

    /// Returns true when `candidate` may be enqueued.
    ///
    /// With cross-domain crawling enabled every http(s) URL qualifies.
    /// Otherwise the candidate's domain must equal one of the seed domains or
    /// be a subdomain of one.
    pub fn in_scope(&self, candidate: &Url) -> bool {
        if self.allow_cross_domain {
            return true;
        }

        let Some(domain) = registrable_domain(candidate) else {
            return false;
        };

        self.seed_domains.iter().any(|seed| {
            domain == *seed || domain.ends_with(&format!(".{}", seed))
        })
    }

    /// The normalized seed domains this policy scopes to.
    pub fn seed_domains(&self) -> impl Iterator<Item = &str> {
        self.seed_domains.iter().map(String::as_str)
    }
}
