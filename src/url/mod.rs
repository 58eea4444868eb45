//! URL handling module
//!
//! Canonicalization (the dedup key for the whole crawl) and the domain-scope
//! policy that keeps discovered links on the seeds' domains.

mod canonical;
mod scope;

pub use canonical::canonicalize;
pub use scope::{registrable_domain, DomainPolicy};
