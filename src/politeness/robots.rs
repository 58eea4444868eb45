//! robots.txt evaluation and per-site caching
//!
//! Each site's robots.txt is fetched at most once per run. An unreachable
//! robots.txt downgrades to allow-all with a warning; it never blocks the
//! crawl.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use robotstxt::DefaultMatcher;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};
use url::Url;

/// Evaluated robots.txt rules for one site
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Raw robots.txt content (empty means allow all)
    content: String,
    /// Explicit allow-all, used when the file could not be fetched
    allow_all: bool,
}

impl RobotsPolicy {
    /// Wraps raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Permissive policy for sites whose robots.txt is missing or unreachable
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Checks whether `url` may be fetched by `user_agent`
    pub fn is_allowed(&self, url: &Url, user_agent: &str) -> bool {
        if self.allow_all || self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url.as_str())
    }

    /// Crawl-delay requested for `user_agent`, if any.
    ///
    /// The robotstxt matcher does not surface this directive, so the groups
    /// are scanned by hand. A group naming the agent specifically beats the
    /// wildcard group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        if self.allow_all || self.content.is_empty() {
            return None;
        }

        let agent = user_agent.to_lowercase();
        let mut group_agents: Vec<String> = Vec::new();
        let mut in_group_header = false;
        let mut wildcard_delay = None;
        let mut agent_delay = None;

        for line in self.content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                // Consecutive user-agent lines share one group.
                if !in_group_header {
                    group_agents.clear();
                    in_group_header = true;
                }
                group_agents.push(value.to_lowercase());
                continue;
            }

            in_group_header = false;
            if key != "crawl-delay" {
                continue;
            }

            let Ok(seconds) = value.parse::<f64>() else {
                continue;
            };
            if seconds < 0.0 {
                continue;
            }

            if group_agents.iter().any(|g| g != "*" && agent.contains(g.as_str())) {
                agent_delay = Some(Duration::from_secs_f64(seconds));
            } else if group_agents.iter().any(|g| g == "*") {
                wildcard_delay = Some(Duration::from_secs_f64(seconds));
            }
        }

        agent_delay.or(wildcard_delay)
    }
}

/// Per-site robots.txt cache, fetched once per run.
pub struct RobotsCache {
    client: reqwest::Client,
    user_agent: String,
    entries: Mutex<HashMap<String, Arc<OnceCell<Arc<RobotsPolicy>>>>>,
}

impl RobotsCache {
    pub fn new(client: reqwest::Client, user_agent: String) -> Self {
        Self {
            client,
            user_agent,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The user agent the cache evaluates rules for
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the policy for the URL's site, fetching robots.txt on first use.
    ///
    /// Concurrent callers for the same site share one fetch.
    pub async fn policy_for(&self, url: &Url) -> Arc<RobotsPolicy> {
        let site = url.authority().to_string();

        let cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(site).or_default().clone()
        };

        cell.get_or_init(|| async { Arc::new(self.fetch_policy(url).await) })
            .await
            .clone()
    }

    /// Convenience wrapper: is this URL allowed for our user agent?
    pub async fn is_allowed(&self, url: &Url) -> bool {
        self.policy_for(url).await.is_allowed(url, &self.user_agent)
    }

    async fn fetch_policy(&self, url: &Url) -> RobotsPolicy {
        let robots_url = format!("{}://{}/robots.txt", url.scheme(), url.authority());

        match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(content) => {
                    debug!(url = %robots_url, "fetched robots.txt");
                    RobotsPolicy::from_content(&content)
                }
                Err(error) => {
                    warn!(url = %robots_url, %error, "failed to read robots.txt body, allowing all");
                    RobotsPolicy::allow_all()
                }
            },
            Ok(response) => {
                // Missing robots.txt is the common case and means no rules.
                debug!(url = %robots_url, status = %response.status(), "no robots.txt, allowing all");
                RobotsPolicy::allow_all()
            }
            Err(error) => {
                warn!(url = %robots_url, %error, "robots.txt unreachable, allowing all");
                RobotsPolicy::allow_all()
            }
        }
    }
}
