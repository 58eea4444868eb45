//! State module for tracking crawl progress
//!
//! `EntryState` is the per-URL state machine (pending, fetching, fetched,
//! failed) and `FailReason` classifies failures with a retryable flag. Both
//! map to stable database strings for durable, resumable runs.

mod entry_state;

pub use entry_state::{EntryState, FailReason};
