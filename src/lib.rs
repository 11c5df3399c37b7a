pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod persistence;
pub mod scoring;
pub mod shard;
pub mod stats;
pub mod tokenizer;

pub use config::IndexConfig;
pub use error::{IndexError, Result};
pub use index::ShardedIndex;
pub use models::*;
pub use shard::{shard_for, Shard, ShardRouter};
pub use stats::IndexStats;
pub use tokenizer::tokenize;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
