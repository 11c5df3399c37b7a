//! The sharded inverted index
//!
//! # Architecture
//!
//! - `index`: `ShardedIndex`, construction, persistence and the worker pool
//! - `ingest`: two-phase batch ingestion (single-threaded collect, parallel apply)
//! - `query`: TF-IDF / boolean ranked search with per-term fan-out
//! - `phrase`: exact phrase matching over positional postings

mod index;
mod ingest;
mod phrase;
mod query;

pub use index::ShardedIndex;
pub use ingest::{collect_batch, CollectedBatch};
pub use phrase::matches_phrase;
pub use query::rank_hits;
