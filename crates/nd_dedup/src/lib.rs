//! Comparison keys and duplicate detection for news articles.
//!
//! Everything here is pure: no I/O, no shared state. [`BatchDeduplicator`]
//! holds the only mutable state and is meant to live for one ingestion cycle.

pub mod batch;
pub mod canonical;
pub mod hash;
pub mod similarity;
pub mod title;

pub use batch::{BatchDeduplicator, BatchRejection, DedupKeys};
pub use canonical::canonicalize;
pub use hash::{content_hash, EMPTY_CONTENT_HASH};
pub use similarity::{ratio, similar, DEFAULT_SIMILARITY_THRESHOLD};
pub use title::normalize;
