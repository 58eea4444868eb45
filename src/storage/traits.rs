//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::{EntryState, FailReason};
use crate::storage::{DocumentRecord, FrontierRecord, RunCounters, RunRecord, RunStatus, UpsertOutcome};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Frontier entry not found: {0}")]
    EntryNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the crawler.
/// Implementations are single-connection; the caller provides the locking.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the effective configuration
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Finalizes a run: status, finish timestamp, and summary counters
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counters: &RunCounters,
    ) -> StorageResult<()>;

    // ===== Document Management =====

    /// Inserts or updates the document stored for `url`.
    ///
    /// URL uniqueness decides insert vs update. The paired full-text index
    /// row is maintained inside the same transaction; when the content hash
    /// is unchanged the index rewrite is skipped.
    ///
    /// # Arguments
    ///
    /// * `url` - Canonical URL, the document key
    /// * `title` - Extracted title, if any
    /// * `content` - Extracted body text
    /// * `strategy` - Name of the extraction strategy that produced the content
    /// * `low_confidence` - True when only the last-resort strategy accepted
    /// * `run_id` - The run performing the upsert
    fn upsert_document(
        &mut self,
        url: &str,
        title: Option<&str>,
        content: &str,
        strategy: &str,
        low_confidence: bool,
        run_id: i64,
    ) -> StorageResult<UpsertOutcome>;

    /// Gets a document by its canonical URL
    fn get_document_by_url(&self, url: &str) -> StorageResult<Option<DocumentRecord>>;

    // ===== Frontier Persistence =====

    /// Writes a frontier entry through to the store in the `pending` state.
    ///
    /// A row left over from an earlier run is reset to `pending` and adopted
    /// by the current run, so re-crawls and resumes share one row per URL.
    fn record_pending(
        &mut self,
        url: &str,
        depth: u32,
        max_depth: u32,
        parent_url: Option<&str>,
        run_id: i64,
    ) -> StorageResult<()>;

    /// Updates the state of a frontier entry.
    ///
    /// # Arguments
    ///
    /// * `url` - Canonical URL of the entry
    /// * `state` - New state
    /// * `reason` - Failure reason, required when `state` is `failed`
    fn update_entry_state(
        &mut self,
        url: &str,
        state: EntryState,
        reason: Option<&FailReason>,
    ) -> StorageResult<()>;

    /// Gets a frontier entry by URL
    fn get_frontier_entry(&self, url: &str) -> StorageResult<Option<FrontierRecord>>;

    /// Loads entries a `--process-pending` invocation should resume:
    /// `pending` rows, `fetching` rows left by an interrupted run, and
    /// `failed` rows whose reason is retryable. Ordered by depth, then
    /// discovery order.
    ///
    /// # Arguments
    ///
    /// * `limit` - Optional cap on the number of entries returned
    fn load_resumable_entries(&self, limit: Option<u32>) -> StorageResult<Vec<FrontierRecord>>;

    /// Loads every URL with a frontier row, regardless of state.
    ///
    /// Used to seed the visited set when resuming, so URLs already handled by
    /// earlier runs are not rediscovered.
    fn load_frontier_urls(&self) -> StorageResult<Vec<String>>;

    // ===== Statistics =====

    /// Counts frontier entries in a given state
    fn count_entries_by_state(&self, state: EntryState) -> StorageResult<u64>;

    /// Counts `failed` frontier entries whose reason is retryable
    fn count_retryable_failed(&self) -> StorageResult<u64>;

    /// Counts stored documents
    fn count_documents(&self) -> StorageResult<u64>;

    /// Counts stored documents carrying the low-confidence marker
    fn count_low_confidence_documents(&self) -> StorageResult<u64>;
}
