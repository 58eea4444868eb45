//! Breadth-first crawl frontier
//!
//! URLs wait here grouped by depth. Deduplication happens at enqueue time: a
//! canonical URL enters the frontier at most once per run, whichever depth
//! offers it first. Dispatch is strictly one depth layer at a time, so depth
//! N is exhausted before anything at depth N+1 is touched.

use std::collections::{BTreeMap, HashSet};
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
    /// Depth bound inherited from the seed this entry descends from
    pub max_depth: u32,
    pub parent: Option<Url>,
}

/// What happened to an offered entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Entry joined its depth layer
    Added,
    /// Canonical form already seen this run
    AlreadyVisited,
    /// Entry is deeper than its seed's depth bound
    TooDeep,
}

/// Depth-layered URL queue with enqueue-time deduplication
#[derive(Debug, Default)]
pub struct Frontier {
    layers: BTreeMap<u32, Vec<FrontierEntry>>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers an entry to the frontier.
    ///
    /// A rejected entry leaves no trace: an entry rejected as too deep under
    /// one seed's bound may be offered again under a deeper-reaching seed.
    pub fn enqueue(&mut self, entry: FrontierEntry) -> EnqueueOutcome {
        if self.visited.contains(entry.url.as_str()) {
            return EnqueueOutcome::AlreadyVisited;
        }

        if entry.depth > entry.max_depth {
            return EnqueueOutcome::TooDeep;
        }

        self.visited.insert(entry.url.to_string());
        self.layers.entry(entry.depth).or_default().push(entry);
        EnqueueOutcome::Added
    }

    /// Marks a URL visited without queueing it.
    ///
    /// Used when resuming, so link discovery cannot re-enqueue URLs the
    /// database already tracks.
    pub fn mark_visited(&mut self, url: &str) {
        self.visited.insert(url.to_string());
    }

    /// Removes and returns the shallowest depth layer
    pub fn pop_layer(&mut self) -> Option<(u32, Vec<FrontierEntry>)> {
        let depth = *self.layers.keys().next()?;
        let layer = self.layers.remove(&depth)?;
        Some((depth, layer))
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Entries queued across all layers
    pub fn len(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }
}
