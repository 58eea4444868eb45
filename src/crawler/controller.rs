//! Crawl controller - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of the
//! crawling process, including:
//! - Initializing storage and creating the run row
//! - Seeding and draining the breadth-first frontier, one depth layer at a time
//! - Dispatching bounded concurrent workers for fetching and extraction
//! - Writing every state transition through to storage as it happens
//! - Finalizing the run with summary counters

use crate::config::{config_digest, Config, Seed};
use crate::crawler::fetcher::{build_http_client, Fetcher, RetryPolicy};
use crate::crawler::frontier::{EnqueueOutcome, Frontier, FrontierEntry};
use crate::crawler::parser::extract_links;
use crate::extract::StrategyChain;
use crate::politeness::{RateLimiter, RobotsCache};
use crate::state::{EntryState, FailReason};
use crate::storage::{
    RunCounters, RunStatus, SqliteStorage, Storage, StorageResult, UpsertOutcome,
};
use crate::url::DomainPolicy;
use crate::GleanerError;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use url::Url;

/// Why the crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The frontier ran out of URLs
    Exhausted,
    /// The page budget was reached
    MaxPages,
    /// The wall-clock deadline passed
    Deadline,
}

/// What a finished run did
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub run_id: i64,
    pub pages_fetched: u64,
    pub pages_failed: u64,
    pub documents_inserted: u64,
    pub documents_updated: u64,
    pub duplicates_skipped: u64,
    pub links_discovered: u64,
    /// Failure counts keyed by reason string
    pub failed_by_reason: BTreeMap<String, u64>,
    pub stop_cause: StopCause,
    pub elapsed: Duration,
}

/// Mutable crawl state shared by the dispatch loop and the workers.
///
/// The lock is never held across an await point.
#[derive(Default)]
struct CrawlState {
    frontier: Frontier,
    /// Entries handed to workers, counted against the page budget
    dispatched: u64,
    pages_fetched: u64,
    pages_failed: u64,
    failed_by_reason: BTreeMap<String, u64>,
    documents_inserted: u64,
    documents_updated: u64,
    duplicates_skipped: u64,
    links_discovered: u64,
}

impl CrawlState {
    fn counters(&self) -> RunCounters {
        RunCounters {
            pages_fetched: self.pages_fetched,
            pages_failed: self.pages_failed,
            documents_inserted: self.documents_inserted,
            documents_updated: self.documents_updated,
            duplicates_skipped: self.duplicates_skipped,
        }
    }
}

/// Main crawl controller
///
/// A controller drives exactly one run: constructing it creates the run row,
/// and `run` or `process_pending` consumes it.
pub struct CrawlController {
    config: Arc<Config>,
    storage: Arc<Mutex<SqliteStorage>>,
    state: Arc<Mutex<CrawlState>>,
    fetcher: Arc<Fetcher>,
    limiter: Arc<RateLimiter>,
    robots: Arc<RobotsCache>,
    chain: Arc<StrategyChain>,
    run_id: i64,
}

impl CrawlController {
    /// Creates a controller and its run row
    ///
    /// # Arguments
    ///
    /// * `config` - The effective configuration, overrides already applied
    /// * `config_hash` - Digest recorded on the run row
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlController)` - Ready to crawl
    /// * `Err(GleanerError)` - Storage or HTTP client initialization failed
    pub fn new(config: Config, config_hash: &str) -> Result<Self, GleanerError> {
        let storage_path = Path::new(&config.output.database_path);
        let mut storage = SqliteStorage::new(storage_path)?;

        // A run row still marked running belongs to a process that never
        // finished; flip it so statistics stay honest.
        if let Some(latest) = storage.get_latest_run()? {
            if latest.status == RunStatus::Running {
                warn!(
                    run_id = latest.id,
                    "Previous run never finished, marking it interrupted"
                );
                storage.finish_run(latest.id, RunStatus::Interrupted, &latest.counters)?;
            }
        }

        let run_id = storage.create_run(config_hash)?;
        info!(run_id, "Created crawl run");

        let client = build_http_client(&config)?;
        let robots = RobotsCache::new(client.clone(), config.user_agent_string());
        let limiter = RateLimiter::new(
            config.politeness.min_interval(),
            config.politeness.burst,
            config.politeness.max_crawl_delay(),
        );
        let fetcher = Fetcher::new(client, RetryPolicy::from_config(&config.fetcher));
        let chain = StrategyChain::standard(config.extraction.min_content_length);

        Ok(Self {
            config: Arc::new(config),
            storage: Arc::new(Mutex::new(storage)),
            state: Arc::new(Mutex::new(CrawlState::default())),
            fetcher: Arc::new(fetcher),
            limiter: Arc::new(limiter),
            robots: Arc::new(robots),
            chain: Arc::new(chain),
            run_id,
        })
    }

    /// The ID of the run this controller drives
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Crawls outward from the given seeds
    ///
    /// Seeds enter at depth 0, exempt from the domain policy. Each seed's
    /// `max_depth` override is inherited by everything discovered from it.
    ///
    /// # Arguments
    ///
    /// * `seeds` - Canonicalized seed URLs
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The run finished; per-URL failures are counted,
    ///   not raised
    /// * `Err(GleanerError)` - The run itself could not proceed
    pub async fn run(self, seeds: &[Seed]) -> Result<CrawlSummary, GleanerError> {
        let seed_urls: Vec<Url> = seeds.iter().map(|s| s.url.clone()).collect();
        let policy = Arc::new(DomainPolicy::new(
            &seed_urls,
            self.config.crawler.allow_cross_domain,
        ));

        {
            let mut state = self.state.lock().await;
            let mut storage = self.storage.lock().await;
            for seed in seeds {
                let max_depth = seed.max_depth.unwrap_or(self.config.crawler.discover_depth);
                let entry = FrontierEntry {
                    url: seed.url.clone(),
                    depth: 0,
                    max_depth,
                    parent: None,
                };
                if state.frontier.enqueue(entry) == EnqueueOutcome::Added {
                    storage.record_pending(seed.url.as_str(), 0, max_depth, None, self.run_id)?;
                }
            }
        }

        info!(run_id = self.run_id, seeds = seeds.len(), "Starting crawl");
        self.finish(self.drive(policy).await).await
    }

    /// Resumes URLs left behind by earlier runs
    ///
    /// Pending rows, fetching rows from interrupted runs, and retryable
    /// failures re-enter the frontier at their stored depths. Link discovery
    /// continues from them under a policy scoped to their domains.
    ///
    /// # Arguments
    ///
    /// * `limit` - Optional cap on how many stored entries to resume
    pub async fn process_pending(self, limit: Option<u32>) -> Result<CrawlSummary, GleanerError> {
        let (entries, known_urls) = {
            let storage = self.storage.lock().await;
            (
                storage.load_resumable_entries(limit)?,
                storage.load_frontier_urls()?,
            )
        };

        let mut roots = Vec::new();
        {
            let mut state = self.state.lock().await;
            for record in &entries {
                let Ok(url) = Url::parse(&record.url) else {
                    warn!(url = %record.url, "Skipping unparseable stored URL");
                    continue;
                };
                let parent = record
                    .parent_url
                    .as_deref()
                    .and_then(|p| Url::parse(p).ok());
                let entry = FrontierEntry {
                    url: url.clone(),
                    depth: record.depth,
                    max_depth: record.max_depth,
                    parent,
                };
                if state.frontier.enqueue(entry) == EnqueueOutcome::Added {
                    roots.push(url);
                }
            }

            // Everything the store already tracks is off limits for
            // rediscovery, whatever state it is in.
            for url in known_urls {
                state.frontier.mark_visited(&url);
            }
        }

        info!(
            run_id = self.run_id,
            resumed = roots.len(),
            "Processing pending URLs"
        );

        // Resumed entries act as this run's roots for scope decisions
        let policy = Arc::new(DomainPolicy::new(
            &roots,
            self.config.crawler.allow_cross_domain,
        ));
        self.finish(self.drive(policy).await).await
    }

    /// Finalizes the run row for a finished or failed drive
    async fn finish(
        &self,
        outcome: Result<CrawlSummary, GleanerError>,
    ) -> Result<CrawlSummary, GleanerError> {
        let counters = {
            let state = self.state.lock().await;
            state.counters()
        };

        match outcome {
            Ok(summary) => {
                let mut storage = self.storage.lock().await;
                storage.finish_run(self.run_id, RunStatus::Completed, &counters)?;
                Ok(summary)
            }
            Err(error) => {
                let mut storage = self.storage.lock().await;
                if let Err(finish_error) =
                    storage.finish_run(self.run_id, RunStatus::Failed, &counters)
                {
                    error!(%finish_error, "Could not mark run failed");
                }
                Err(error)
            }
        }
    }

    /// Drains the frontier one depth layer at a time.
    ///
    /// Depth N finishes completely before depth N+1 starts. Budget and
    /// deadline are checked before every dispatch, so a mid-layer stop leaves
    /// the remaining URLs pending in storage.
    async fn drive(&self, policy: Arc<DomainPolicy>) -> Result<CrawlSummary, GleanerError> {
        let started = Instant::now();
        let deadline = self
            .config
            .crawler
            .deadline_secs
            .map(|secs| started + Duration::from_secs(secs));
        let max_pages = self.config.crawler.max_pages;
        let semaphore = Arc::new(Semaphore::new(self.config.crawler.max_workers as usize));
        let mut stop = None;

        while stop.is_none() {
            let layer = {
                let mut state = self.state.lock().await;
                state.frontier.pop_layer()
            };
            let Some((depth, entries)) = layer else {
                break;
            };

            debug!(depth, count = entries.len(), "Dispatching depth layer");
            let mut workers = JoinSet::new();
            let mut left_pending = 0u64;

            for entry in entries {
                if stop.is_none() {
                    if let Some(deadline) = deadline {
                        if Instant::now() >= deadline {
                            stop = Some(StopCause::Deadline);
                        }
                    }
                }

                if stop.is_none() {
                    let mut state = self.state.lock().await;
                    match max_pages {
                        Some(limit) if state.dispatched >= limit => {
                            stop = Some(StopCause::MaxPages);
                        }
                        _ => state.dispatched += 1,
                    }
                }

                if stop.is_some() {
                    // The entry's row stays pending for a later run
                    left_pending += 1;
                    continue;
                }

                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    break;
                };

                let worker = self.worker(Arc::clone(&policy));
                workers.spawn(async move {
                    let _permit = permit;
                    worker.process_entry(entry).await
                });
            }

            // Layer barrier: nothing at the next depth starts until every
            // worker at this depth has finished.
            while let Some(joined) = workers.join_next().await {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => error!(%error, "Worker could not persist crawl state"),
                    Err(error) => error!(%error, "Worker task panicked"),
                }
            }

            let (fetched, failed, queued) = {
                let state = self.state.lock().await;
                (state.pages_fetched, state.pages_failed, state.frontier.len())
            };
            info!(depth, fetched, failed, queued, "Depth layer complete");

            if left_pending > 0 {
                info!(left_pending, "Stopping early, remaining URLs stay pending");
            }
        }

        let stop_cause = stop.unwrap_or(StopCause::Exhausted);
        let elapsed = started.elapsed();
        let state = self.state.lock().await;
        let summary = CrawlSummary {
            run_id: self.run_id,
            pages_fetched: state.pages_fetched,
            pages_failed: state.pages_failed,
            documents_inserted: state.documents_inserted,
            documents_updated: state.documents_updated,
            duplicates_skipped: state.duplicates_skipped,
            links_discovered: state.links_discovered,
            failed_by_reason: state.failed_by_reason.clone(),
            stop_cause,
            elapsed,
        };

        info!(
            run_id = self.run_id,
            pages_fetched = summary.pages_fetched,
            pages_failed = summary.pages_failed,
            documents_inserted = summary.documents_inserted,
            documents_updated = summary.documents_updated,
            duplicates_skipped = summary.duplicates_skipped,
            stop_cause = ?summary.stop_cause,
            elapsed_ms = elapsed.as_millis() as u64,
            "Crawl finished"
        );

        Ok(summary)
    }

    fn worker(&self, policy: Arc<DomainPolicy>) -> Worker {
        Worker {
            storage: Arc::clone(&self.storage),
            state: Arc::clone(&self.state),
            fetcher: Arc::clone(&self.fetcher),
            limiter: Arc::clone(&self.limiter),
            robots: Arc::clone(&self.robots),
            chain: Arc::clone(&self.chain),
            policy,
            run_id: self.run_id,
        }
    }
}

/// Everything one worker task needs, all cheaply cloneable handles
struct Worker {
    storage: Arc<Mutex<SqliteStorage>>,
    state: Arc<Mutex<CrawlState>>,
    fetcher: Arc<Fetcher>,
    limiter: Arc<RateLimiter>,
    robots: Arc<RobotsCache>,
    chain: Arc<StrategyChain>,
    policy: Arc<DomainPolicy>,
    run_id: i64,
}

impl Worker {
    /// Fetches one URL and writes every outcome through to storage.
    ///
    /// A failure here is terminal for the entry, never for the run. The
    /// returned error covers storage trouble only.
    async fn process_entry(self, entry: FrontierEntry) -> StorageResult<()> {
        let url = &entry.url;
        debug!(url = %url, depth = entry.depth, "Processing URL");

        {
            let mut storage = self.storage.lock().await;
            storage.update_entry_state(url.as_str(), EntryState::Fetching, None)?;
        }

        // robots.txt gate; a disallowed URL is never fetched
        let robots_policy = self.robots.policy_for(url).await;
        if !robots_policy.is_allowed(url, self.robots.user_agent()) {
            info!(url = %url, "Disallowed by robots.txt");
            return self.mark_failed(url, FailReason::Disallowed).await;
        }
        let crawl_delay = robots_policy.crawl_delay(self.robots.user_agent());

        let page = match self.fetcher.fetch(url, &self.limiter, crawl_delay).await {
            Ok(page) => page,
            Err(error) => {
                warn!(url = %url, %error, "Fetch failed");
                return self.mark_failed(url, error.fail_reason()).await;
            }
        };

        {
            let mut state = self.state.lock().await;
            state.pages_fetched += 1;
        }

        // The standard chain never declines, but the write-through still
        // needs a terminal state if a custom chain ever does.
        let Some(content) = self.chain.extract(&page.body, &page.final_url) else {
            warn!(url = %url, "No extraction strategy produced content");
            return self.mark_failed(url, FailReason::Extraction).await;
        };

        if content.low_confidence {
            debug!(url = %url, strategy = content.strategy, "Only the last-resort strategy produced content");
        }

        let outcome = {
            let mut storage = self.storage.lock().await;
            let outcome = storage.upsert_document(
                url.as_str(),
                content.title.as_deref(),
                &content.body,
                content.strategy,
                content.low_confidence,
                self.run_id,
            )?;
            storage.update_entry_state(url.as_str(), EntryState::Fetched, None)?;
            outcome
        };

        {
            let mut state = self.state.lock().await;
            match outcome {
                UpsertOutcome::Inserted => state.documents_inserted += 1,
                UpsertOutcome::Updated => state.documents_updated += 1,
                UpsertOutcome::Unchanged => state.duplicates_skipped += 1,
            }
        }

        // Unchanged content was already mined for links by an earlier run
        if outcome.content_changed() && entry.depth < entry.max_depth {
            self.discover_links(&entry, &page.final_url, &page.body)
                .await?;
        }

        Ok(())
    }

    /// Runs link discovery for a fetched page and enqueues what qualifies
    async fn discover_links(
        &self,
        entry: &FrontierEntry,
        base: &Url,
        body: &str,
    ) -> StorageResult<()> {
        let mut added = 0u64;

        for link in extract_links(body, base) {
            if !self.policy.in_scope(&link) {
                continue;
            }

            let child = FrontierEntry {
                url: link.clone(),
                depth: entry.depth + 1,
                max_depth: entry.max_depth,
                parent: Some(entry.url.clone()),
            };

            let outcome = {
                let mut state = self.state.lock().await;
                state.frontier.enqueue(child)
            };

            if outcome == EnqueueOutcome::Added {
                let mut storage = self.storage.lock().await;
                storage.record_pending(
                    link.as_str(),
                    entry.depth + 1,
                    entry.max_depth,
                    Some(entry.url.as_str()),
                    self.run_id,
                )?;
                added += 1;
            }
        }

        if added > 0 {
            let mut state = self.state.lock().await;
            state.links_discovered += added;
            debug!(parent = %entry.url, added, "Discovered links");
        }

        Ok(())
    }

    /// Records a terminal failure for an entry
    async fn mark_failed(&self, url: &Url, reason: FailReason) -> StorageResult<()> {
        {
            let mut state = self.state.lock().await;
            state.pages_failed += 1;
            *state
                .failed_by_reason
                .entry(reason.to_db_string())
                .or_insert(0) += 1;
        }

        let mut storage = self.storage.lock().await;
        storage.update_entry_state(url.as_str(), EntryState::Failed, Some(&reason))
    }
}

/// Runs a complete crawl from configuration and seeds
///
/// # Arguments
///
/// * `config` - The effective configuration
/// * `seeds` - Canonicalized seed URLs
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The run finished
/// * `Err(GleanerError)` - The run could not proceed
///
/// # Example
///
/// ```no_run
/// use gleaner::config::{load_config, load_seeds};
/// use gleaner::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("gleaner.toml"))?;
/// let seeds = load_seeds(Path::new("seeds.json"))?;
/// let summary = crawl(config, &seeds).await?;
/// println!("Fetched {} pages", summary.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config, seeds: &[Seed]) -> Result<CrawlSummary, GleanerError> {
    let digest = config_digest(&config);
    let controller = CrawlController::new(config, &digest)?;
    controller.run(seeds).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.output.database_path = dir
            .path()
            .join("crawl.db")
            .to_string_lossy()
            .into_owned();
        config.politeness.min_interval_ms = 0;
        config.fetcher.request_timeout_secs = 2;
        config.fetcher.connect_timeout_secs = 1;
        config.fetcher.max_retries = 0;
        config
    }

    fn open(config: &Config) -> SqliteStorage {
        SqliteStorage::new(Path::new(&config.output.database_path)).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_seed_fails_without_aborting_run() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let controller = CrawlController::new(config.clone(), "digest").unwrap();
        let run_id = controller.run_id();
        let seeds = vec![Seed {
            // Nothing listens on port 1
            url: Url::parse("http://127.0.0.1:1/").unwrap(),
            max_depth: None,
        }];

        let summary = controller.run(&seeds).await.unwrap();

        assert_eq!(summary.run_id, run_id);
        assert_eq!(summary.pages_fetched, 0);
        assert_eq!(summary.pages_failed, 1);
        assert_eq!(summary.stop_cause, StopCause::Exhausted);
        assert_eq!(summary.failed_by_reason.get("connection"), Some(&1));

        let storage = open(&config);
        let entry = storage
            .get_frontier_entry("http://127.0.0.1:1/")
            .unwrap()
            .unwrap();
        assert_eq!(entry.state, EntryState::Failed);
        assert_eq!(entry.fail_reason, Some(FailReason::Connection));
        assert!(entry.retryable);

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.counters.pages_failed, 1);
    }

    #[tokio::test]
    async fn test_process_pending_with_empty_store() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let controller = CrawlController::new(config, "digest").unwrap();
        let summary = controller.process_pending(None).await.unwrap();

        assert_eq!(summary.pages_fetched, 0);
        assert_eq!(summary.pages_failed, 0);
        assert_eq!(summary.stop_cause, StopCause::Exhausted);
    }

    #[tokio::test]
    async fn test_stale_running_run_marked_interrupted() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let stale_id = {
            let mut storage = open(&config);
            storage.create_run("old").unwrap()
        };

        let controller = CrawlController::new(config.clone(), "new").unwrap();

        let storage = open(&config);
        let stale = storage.get_run(stale_id).unwrap();
        assert_eq!(stale.status, RunStatus::Interrupted);

        let current = storage.get_run(controller.run_id()).unwrap();
        assert_eq!(current.status, RunStatus::Running);
    }

    #[tokio::test]
    async fn test_duplicate_seeds_recorded_once() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let controller = CrawlController::new(config.clone(), "digest").unwrap();
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let seeds = vec![
            Seed {
                url: url.clone(),
                max_depth: None,
            },
            Seed {
                url,
                max_depth: Some(4),
            },
        ];

        let summary = controller.run(&seeds).await.unwrap();

        // The duplicate seed is dropped at enqueue, so only one fetch happens
        assert_eq!(summary.pages_failed, 1);

        let storage = open(&config);
        assert_eq!(
            storage.count_entries_by_state(EntryState::Failed).unwrap(),
            1
        );
    }
}
