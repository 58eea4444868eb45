//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::{EntryState, FailReason};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{
    DocumentRecord, FrontierRecord, RunCounters, RunRecord, RunStatus, UpsertOutcome,
};
use crate::GleanerError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(GleanerError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, GleanerError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance under concurrent access
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, GleanerError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Hex SHA-256 digest of document content, used to detect unchanged re-crawls
fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

fn map_run(row: &Row<'_>) -> Result<RunRecord, rusqlite::Error> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        counters: RunCounters {
            pages_fetched: row.get::<_, i64>(5)? as u64,
            pages_failed: row.get::<_, i64>(6)? as u64,
            documents_inserted: row.get::<_, i64>(7)? as u64,
            documents_updated: row.get::<_, i64>(8)? as u64,
            duplicates_skipped: row.get::<_, i64>(9)? as u64,
        },
    })
}

fn map_frontier_entry(row: &Row<'_>) -> Result<FrontierRecord, rusqlite::Error> {
    let reason: Option<String> = row.get(6)?;
    Ok(FrontierRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        depth: row.get(2)?,
        max_depth: row.get(3)?,
        parent_url: row.get(4)?,
        state: EntryState::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(EntryState::Failed),
        fail_reason: reason.and_then(|r| FailReason::from_db_string(&r)),
        retryable: row.get(7)?,
        discovered_run: row.get(8)?,
        discovered_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn map_document(row: &Row<'_>) -> Result<DocumentRecord, rusqlite::Error> {
    Ok(DocumentRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        content_hash: row.get(4)?,
        strategy: row.get(5)?,
        low_confidence: row.get(6)?,
        first_seen_run: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, \
     pages_fetched, pages_failed, documents_inserted, documents_updated, duplicates_skipped";

const FRONTIER_COLUMNS: &str = "id, url, depth, max_depth, parent_url, state, fail_reason, \
     retryable, discovered_run, discovered_at, updated_at";

const DOCUMENT_COLUMNS: &str = "id, url, title, content, content_hash, strategy, \
     low_confidence, first_seen_run, created_at, updated_at";

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS))?;

        let run = stmt
            .query_row(params![run_id], map_run)
            .map_err(|_| StorageError::RunNotFound(run_id))?;

        Ok(run)
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM runs ORDER BY id DESC LIMIT 1",
            RUN_COLUMNS
        ))?;

        let run = stmt.query_row([], map_run).optional()?;

        Ok(run)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counters: &RunCounters,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_fetched = ?3,
             pages_failed = ?4, documents_inserted = ?5, documents_updated = ?6,
             duplicates_skipped = ?7 WHERE id = ?8",
            params![
                status.to_db_string(),
                now,
                counters.pages_fetched as i64,
                counters.pages_failed as i64,
                counters.documents_inserted as i64,
                counters.documents_updated as i64,
                counters.duplicates_skipped as i64,
                run_id
            ],
        )?;
        Ok(())
    }

    // ===== Document Management =====

    fn upsert_document(
        &mut self,
        url: &str,
        title: Option<&str>,
        content: &str,
        strategy: &str,
        low_confidence: bool,
        run_id: i64,
    ) -> StorageResult<UpsertOutcome> {
        let now = Utc::now().to_rfc3339();
        let hash = content_hash(content);
        let tx = self.conn.transaction()?;

        let existing: Option<(i64, String)> = tx
            .query_row(
                "SELECT id, content_hash FROM documents WHERE url = ?1",
                params![url],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let outcome = match existing {
            None => {
                tx.execute(
                    "INSERT INTO documents
                     (url, title, content, content_hash, strategy, low_confidence,
                      first_seen_run, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                    params![url, title, content, hash, strategy, low_confidence, run_id, now],
                )?;
                let doc_id = tx.last_insert_rowid();
                tx.execute(
                    "INSERT INTO document_index (rowid, title, content) VALUES (?1, ?2, ?3)",
                    params![doc_id, title, content],
                )?;
                UpsertOutcome::Inserted
            }
            Some((doc_id, old_hash)) if old_hash == hash => {
                // Same content: refresh the timestamp, leave the index alone.
                tx.execute(
                    "UPDATE documents SET updated_at = ?1 WHERE id = ?2",
                    params![now, doc_id],
                )?;
                UpsertOutcome::Unchanged
            }
            Some((doc_id, _)) => {
                tx.execute(
                    "UPDATE documents SET title = ?1, content = ?2, content_hash = ?3,
                     strategy = ?4, low_confidence = ?5, updated_at = ?6 WHERE id = ?7",
                    params![title, content, hash, strategy, low_confidence, now, doc_id],
                )?;
                tx.execute(
                    "DELETE FROM document_index WHERE rowid = ?1",
                    params![doc_id],
                )?;
                tx.execute(
                    "INSERT INTO document_index (rowid, title, content) VALUES (?1, ?2, ?3)",
                    params![doc_id, title, content],
                )?;
                UpsertOutcome::Updated
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn get_document_by_url(&self, url: &str) -> StorageResult<Option<DocumentRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM documents WHERE url = ?1",
            DOCUMENT_COLUMNS
        ))?;

        let document = stmt.query_row(params![url], map_document).optional()?;

        Ok(document)
    }

    // ===== Frontier Persistence =====

    fn record_pending(
        &mut self,
        url: &str,
        depth: u32,
        max_depth: u32,
        parent_url: Option<&str>,
        run_id: i64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO frontier
             (url, depth, max_depth, parent_url, state, retryable,
              discovered_run, discovered_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?7)
             ON CONFLICT(url) DO UPDATE SET
                 state = excluded.state,
                 fail_reason = NULL,
                 retryable = 0,
                 depth = excluded.depth,
                 max_depth = excluded.max_depth,
                 parent_url = excluded.parent_url,
                 discovered_run = excluded.discovered_run,
                 updated_at = excluded.updated_at",
            params![
                url,
                depth,
                max_depth,
                parent_url,
                EntryState::Pending.to_db_string(),
                run_id,
                now
            ],
        )?;
        Ok(())
    }

    fn update_entry_state(
        &mut self,
        url: &str,
        state: EntryState,
        reason: Option<&FailReason>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE frontier SET state = ?1, fail_reason = ?2, retryable = ?3, updated_at = ?4
             WHERE url = ?5",
            params![
                state.to_db_string(),
                reason.map(|r| r.to_db_string()),
                reason.map(|r| r.is_retryable()).unwrap_or(false),
                now,
                url
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::EntryNotFound(url.to_string()));
        }
        Ok(())
    }

    fn get_frontier_entry(&self, url: &str) -> StorageResult<Option<FrontierRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM frontier WHERE url = ?1",
            FRONTIER_COLUMNS
        ))?;

        let entry = stmt
            .query_row(params![url], map_frontier_entry)
            .optional()?;

        Ok(entry)
    }

    fn load_resumable_entries(&self, limit: Option<u32>) -> StorageResult<Vec<FrontierRecord>> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM frontier
             WHERE state IN (?1, ?2) OR (state = ?3 AND retryable = 1)
             ORDER BY depth ASC, id ASC
             LIMIT ?4",
            FRONTIER_COLUMNS
        ))?;

        let entries = stmt
            .query_map(
                params![
                    EntryState::Pending.to_db_string(),
                    EntryState::Fetching.to_db_string(),
                    EntryState::Failed.to_db_string(),
                    limit
                ],
                map_frontier_entry,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn load_frontier_urls(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT url FROM frontier")?;

        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(urls)
    }

    // ===== Statistics =====

    fn count_entries_by_state(&self, state: EntryState) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM frontier WHERE state = ?1",
            params![state.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_retryable_failed(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM frontier WHERE state = ?1 AND retryable = 1",
            params![EntryState::Failed.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_documents(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_low_confidence_documents(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE low_confidence = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_count(storage: &SqliteStorage, query: &str) -> i64 {
        storage
            .conn
            .query_row(
                "SELECT COUNT(*) FROM document_index WHERE document_index MATCH ?1",
                params![query],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn test_create_in_memory() {
        let storage = SqliteStorage::new_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_create_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();
        assert!(run_id > 0);

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.finished_at.is_none());
    }

    #[test]
    fn test_finish_run_persists_counters() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();

        let counters = RunCounters {
            pages_fetched: 10,
            pages_failed: 2,
            documents_inserted: 7,
            documents_updated: 1,
            duplicates_skipped: 2,
        };
        storage
            .finish_run(run_id, RunStatus::Completed, &counters)
            .unwrap();

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert!(run.finished_at.is_some());
        assert_eq!(run.counters, counters);
    }

    #[test]
    fn test_get_latest_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.get_latest_run().unwrap().is_none());

        storage.create_run("first").unwrap();
        let second = storage.create_run("second").unwrap();

        let latest = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(latest.id, second);
        assert_eq!(latest.config_hash, "second");
    }

    #[test]
    fn test_upsert_inserts_new_document() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();

        let outcome = storage
            .upsert_document(
                "https://example.com/a",
                Some("Page A"),
                "some page text",
                "readability",
                false,
                run_id,
            )
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        let doc = storage
            .get_document_by_url("https://example.com/a")
            .unwrap()
            .unwrap();
        assert_eq!(doc.title, Some("Page A".to_string()));
        assert_eq!(doc.content, "some page text");
        assert_eq!(doc.strategy, "readability");
        assert!(!doc.low_confidence);
        assert_eq!(doc.content_hash.len(), 64);
    }

    #[test]
    fn test_upsert_same_content_is_unchanged() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();

        storage
            .upsert_document("https://example.com/a", None, "body", "plain_text", true, run_id)
            .unwrap();
        let outcome = storage
            .upsert_document("https://example.com/a", None, "body", "plain_text", true, run_id)
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Unchanged);
        assert_eq!(storage.count_documents().unwrap(), 1);
    }

    #[test]
    fn test_upsert_changed_content_rewrites_index() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();

        storage
            .upsert_document(
                "https://example.com/a",
                Some("A"),
                "ancient history",
                "readability",
                false,
                run_id,
            )
            .unwrap();
        assert_eq!(match_count(&storage, "ancient"), 1);

        let outcome = storage
            .upsert_document(
                "https://example.com/a",
                Some("A"),
                "modern physics",
                "readability",
                false,
                run_id,
            )
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(storage.count_documents().unwrap(), 1);
        assert_eq!(match_count(&storage, "ancient"), 0);
        assert_eq!(match_count(&storage, "modern"), 1);
    }

    #[test]
    fn test_full_text_index_stems_terms() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();

        storage
            .upsert_document(
                "https://example.com/a",
                Some("Borrowing"),
                "rules for borrowing values",
                "readability",
                false,
                run_id,
            )
            .unwrap();

        assert_eq!(match_count(&storage, "borrow"), 1);
    }

    #[test]
    fn test_record_pending_and_get() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();

        storage
            .record_pending(
                "https://example.com/a",
                1,
                3,
                Some("https://example.com"),
                run_id,
            )
            .unwrap();

        let entry = storage
            .get_frontier_entry("https://example.com/a")
            .unwrap()
            .unwrap();
        assert_eq!(entry.depth, 1);
        assert_eq!(entry.max_depth, 3);
        assert_eq!(entry.parent_url, Some("https://example.com".to_string()));
        assert_eq!(entry.state, EntryState::Pending);
        assert!(entry.fail_reason.is_none());
    }

    #[test]
    fn test_update_entry_state_transitions() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();
        storage
            .record_pending("https://example.com/a", 0, 2, None, run_id)
            .unwrap();

        storage
            .update_entry_state("https://example.com/a", EntryState::Fetching, None)
            .unwrap();
        let entry = storage
            .get_frontier_entry("https://example.com/a")
            .unwrap()
            .unwrap();
        assert_eq!(entry.state, EntryState::Fetching);

        storage
            .update_entry_state(
                "https://example.com/a",
                EntryState::Failed,
                Some(&FailReason::Http(503)),
            )
            .unwrap();
        let entry = storage
            .get_frontier_entry("https://example.com/a")
            .unwrap()
            .unwrap();
        assert_eq!(entry.state, EntryState::Failed);
        assert_eq!(entry.fail_reason, Some(FailReason::Http(503)));
        assert!(entry.retryable);
    }

    #[test]
    fn test_update_entry_state_unknown_url() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let result =
            storage.update_entry_state("https://example.com/nope", EntryState::Fetched, None);
        assert!(matches!(result, Err(StorageError::EntryNotFound(_))));
    }

    #[test]
    fn test_record_pending_resets_failed_row() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let first_run = storage.create_run("first").unwrap();
        storage
            .record_pending("https://example.com/a", 2, 2, None, first_run)
            .unwrap();
        storage
            .update_entry_state(
                "https://example.com/a",
                EntryState::Failed,
                Some(&FailReason::Timeout),
            )
            .unwrap();

        let second_run = storage.create_run("second").unwrap();
        storage
            .record_pending("https://example.com/a", 0, 1, None, second_run)
            .unwrap();

        let entry = storage
            .get_frontier_entry("https://example.com/a")
            .unwrap()
            .unwrap();
        assert_eq!(entry.state, EntryState::Pending);
        assert_eq!(entry.depth, 0);
        assert_eq!(entry.discovered_run, second_run);
        assert!(entry.fail_reason.is_none());
        assert!(!entry.retryable);
    }

    #[test]
    fn test_load_resumable_entries() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();

        storage
            .record_pending("https://example.com/pending", 1, 2, None, run_id)
            .unwrap();
        storage
            .record_pending("https://example.com/fetching", 0, 2, None, run_id)
            .unwrap();
        storage
            .update_entry_state("https://example.com/fetching", EntryState::Fetching, None)
            .unwrap();
        storage
            .record_pending("https://example.com/done", 0, 2, None, run_id)
            .unwrap();
        storage
            .update_entry_state("https://example.com/done", EntryState::Fetched, None)
            .unwrap();
        storage
            .record_pending("https://example.com/retryable", 0, 2, None, run_id)
            .unwrap();
        storage
            .update_entry_state(
                "https://example.com/retryable",
                EntryState::Failed,
                Some(&FailReason::Timeout),
            )
            .unwrap();
        storage
            .record_pending("https://example.com/permanent", 0, 2, None, run_id)
            .unwrap();
        storage
            .update_entry_state(
                "https://example.com/permanent",
                EntryState::Failed,
                Some(&FailReason::Http(404)),
            )
            .unwrap();

        let entries = storage.load_resumable_entries(None).unwrap();
        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();

        assert_eq!(entries.len(), 3);
        assert!(urls.contains(&"https://example.com/pending"));
        assert!(urls.contains(&"https://example.com/fetching"));
        assert!(urls.contains(&"https://example.com/retryable"));

        // Depth 0 entries come before depth 1
        assert_eq!(entries.last().unwrap().url, "https://example.com/pending");
    }

    #[test]
    fn test_load_frontier_urls_includes_terminal_states() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();

        storage
            .record_pending("https://example.com/a", 0, 2, None, run_id)
            .unwrap();
        storage
            .record_pending("https://example.com/b", 1, 2, None, run_id)
            .unwrap();
        storage
            .update_entry_state("https://example.com/b", EntryState::Fetched, None)
            .unwrap();

        let mut urls = storage.load_frontier_urls().unwrap();
        urls.sort();
        assert_eq!(
            urls,
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn test_load_resumable_entries_with_limit() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();

        for i in 0..5 {
            storage
                .record_pending(&format!("https://example.com/{}", i), 0, 2, None, run_id)
                .unwrap();
        }

        let entries = storage.load_resumable_entries(Some(2)).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_statistics_counts() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();

        storage
            .record_pending("https://example.com/a", 0, 2, None, run_id)
            .unwrap();
        storage
            .record_pending("https://example.com/b", 0, 2, None, run_id)
            .unwrap();
        storage
            .update_entry_state("https://example.com/b", EntryState::Fetched, None)
            .unwrap();
        storage
            .record_pending("https://example.com/c", 1, 2, None, run_id)
            .unwrap();
        storage
            .update_entry_state(
                "https://example.com/c",
                EntryState::Failed,
                Some(&FailReason::Connection),
            )
            .unwrap();

        storage
            .upsert_document("https://example.com/b", None, "text", "plain_text", true, run_id)
            .unwrap();

        assert_eq!(
            storage.count_entries_by_state(EntryState::Pending).unwrap(),
            1
        );
        assert_eq!(
            storage.count_entries_by_state(EntryState::Fetched).unwrap(),
            1
        );
        assert_eq!(
            storage.count_entries_by_state(EntryState::Failed).unwrap(),
            1
        );
        assert_eq!(storage.count_retryable_failed().unwrap(), 1);
        assert_eq!(storage.count_documents().unwrap(), 1);
        assert_eq!(storage.count_low_confidence_documents().unwrap(), 1);
    }

    #[test]
    fn test_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.db");

        {
            let mut storage = SqliteStorage::new(&path).unwrap();
            let run_id = storage.create_run("test_hash").unwrap();
            storage
                .record_pending("https://example.com/a", 0, 2, None, run_id)
                .unwrap();
            storage
                .upsert_document(
                    "https://example.com/b",
                    Some("B"),
                    "persisted text",
                    "readability",
                    false,
                    run_id,
                )
                .unwrap();
        }

        let storage = SqliteStorage::new(&path).unwrap();
        assert_eq!(storage.count_documents().unwrap(), 1);
        assert_eq!(
            storage.count_entries_by_state(EntryState::Pending).unwrap(),
            1
        );
        assert_eq!(match_count(&storage, "persisted"), 1);
    }
}
