//! Reporting on the stored corpus
//!
//! This module handles:
//! - Loading corpus and frontier statistics from storage
//! - Printing them for the `--stats` command

mod stats;

pub use stats::{load_statistics, print_statistics, CorpusStatistics};
