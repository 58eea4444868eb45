//! Storage module for the document corpus and durable crawl state
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Document upserts paired with full-text index maintenance
//! - Durable frontier rows for crash recovery and `--process-pending`
//! - Run tracking with summary counters

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::{EntryState, FailReason};
use crate::GleanerError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(GleanerError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, GleanerError> {
    SqliteStorage::new(path)
}

/// Result of a document upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The URL was not in the store; a new document was created
    Inserted,
    /// The URL existed and its content changed; document and index rewritten
    Updated,
    /// The URL existed with identical content; the index was left untouched
    Unchanged,
}

impl UpsertOutcome {
    /// True when the upsert created a new document
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted)
    }

    /// True when the stored content differs from what was there before
    pub fn content_changed(&self) -> bool {
        matches!(self, Self::Inserted | Self::Updated)
    }
}

/// Represents a persisted document
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub content: String,
    pub content_hash: String,
    pub strategy: String,
    pub low_confidence: bool,
    pub first_seen_run: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Represents a durable frontier entry
#[derive(Debug, Clone)]
pub struct FrontierRecord {
    pub id: i64,
    pub url: String,
    pub depth: u32,
    pub max_depth: u32,
    pub parent_url: Option<String>,
    pub state: EntryState,
    pub fail_reason: Option<FailReason>,
    pub retryable: bool,
    pub discovered_run: i64,
    pub discovered_at: String,
    pub updated_at: String,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub counters: RunCounters,
}

/// Summary counters persisted onto a run row at completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub pages_fetched: u64,
    pub pages_failed: u64,
    pub documents_inserted: u64,
    pub documents_updated: u64,
    pub duplicates_skipped: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
