//! Statistics reporting from the corpus database
//!
//! This module answers `--stats`: corpus size, frontier composition, and the
//! most recent run's outcome, all read straight from storage.

use crate::state::EntryState;
use crate::storage::{RunRecord, Storage, StorageResult};

/// Snapshot of the corpus and crawl state
#[derive(Debug, Clone)]
pub struct CorpusStatistics {
    /// Stored documents
    pub documents: u64,

    /// Documents carrying the low-confidence marker
    pub low_confidence_documents: u64,

    /// Frontier entries waiting to be fetched
    pub pending: u64,

    /// Frontier entries an interrupted run left mid-fetch
    pub fetching: u64,

    /// Frontier entries fetched successfully
    pub fetched: u64,

    /// Frontier entries that failed
    pub failed: u64,

    /// Failed entries a `--process-pending` run would retry
    pub retryable_failed: u64,

    /// Most recent run, if any
    pub latest_run: Option<RunRecord>,
}

impl CorpusStatistics {
    /// Entries a `--process-pending` run would pick up
    pub fn resumable(&self) -> u64 {
        self.pending + self.fetching + self.retryable_failed
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CorpusStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<CorpusStatistics> {
    Ok(CorpusStatistics {
        documents: storage.count_documents()?,
        low_confidence_documents: storage.count_low_confidence_documents()?,
        pending: storage.count_entries_by_state(EntryState::Pending)?,
        fetching: storage.count_entries_by_state(EntryState::Fetching)?,
        fetched: storage.count_entries_by_state(EntryState::Fetched)?,
        failed: storage.count_entries_by_state(EntryState::Failed)?,
        retryable_failed: storage.count_retryable_failed()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CorpusStatistics) {
    println!("=== Corpus Statistics ===\n");

    println!("Documents:");
    println!("  Stored: {}", stats.documents);
    let low_pct = if stats.documents > 0 {
        (stats.low_confidence_documents as f64 / stats.documents as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "  Low confidence: {} ({:.1}%)",
        stats.low_confidence_documents, low_pct
    );
    println!();

    println!("Frontier:");
    println!("  Pending: {}", stats.pending);
    println!("  Fetching: {}", stats.fetching);
    println!("  Fetched: {}", stats.fetched);
    println!(
        "  Failed: {} ({} retryable)",
        stats.failed, stats.retryable_failed
    );
    println!("  Resumable with --process-pending: {}", stats.resumable());
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  ID: {}", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            match &run.finished_at {
                Some(finished) => println!("  Finished: {}", finished),
                None => println!("  Finished: -"),
            }
            println!("  Pages fetched: {}", run.counters.pages_fetched);
            println!("  Pages failed: {}", run.counters.pages_failed);
            println!("  Documents inserted: {}", run.counters.documents_inserted);
            println!("  Documents updated: {}", run.counters.documents_updated);
            println!("  Duplicates skipped: {}", run.counters.duplicates_skipped);
        }
        None => println!("Latest Run: none"),
    }
}
