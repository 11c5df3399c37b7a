//! Vocabulary partitions of the inverted index
//!
//! # Architecture
//!
//! - `router`: stable term → shard mapping
//! - `postings`: term → document → positions storage and collect-phase buffers
//! - `shard`: a lock-guarded, independently persisted partition

mod postings;
mod router;
mod shard;

pub use postings::*;
pub use router::*;
pub use shard::*;
