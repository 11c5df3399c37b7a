use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{IndexError, Result};

pub const DEFAULT_SHARD_COUNT: usize = 4;
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_PHRASE_CHUNK_SIZE: usize = 100;

/// Construction configuration for a [`crate::ShardedIndex`].
///
/// `shard_count` is fixed for the lifetime of an on-disk index: reopening a
/// directory with a different value is rejected.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding the shard and metadata files
    pub base_path: PathBuf,
    /// Number of vocabulary partitions (and worker threads)
    pub shard_count: usize,
    /// Documents per ingestion batch
    pub batch_size: usize,
    /// Candidate documents verified per group during phrase search
    pub phrase_chunk_size: usize,
    /// Persist dirty state at the end of every `ingest` call
    pub flush_after_ingest: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("./index_data"),
            shard_count: DEFAULT_SHARD_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            phrase_chunk_size: DEFAULT_PHRASE_CHUNK_SIZE,
            flush_after_ingest: true,
        }
    }
}

impl IndexConfig {
    /// Create a configuration rooted at `base_path` with default tuning
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Default::default()
        }
    }

    /// Set the number of shards
    pub fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    /// Set the ingestion batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the phrase verification group size
    pub fn with_phrase_chunk_size(mut self, chunk_size: usize) -> Self {
        self.phrase_chunk_size = chunk_size;
        self
    }

    /// Enable or disable the flush at the end of `ingest`
    pub fn with_flush_after_ingest(mut self, enabled: bool) -> Self {
        self.flush_after_ingest = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(IndexError::Configuration(
                "shard_count must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(IndexError::Configuration(
                "batch_size must be positive".to_string(),
            ));
        }
        if self.phrase_chunk_size == 0 {
            return Err(IndexError::Configuration(
                "phrase_chunk_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the corpus metadata file
    pub fn metadata_path(&self) -> PathBuf {
        self.base_path.join("metadata.idx")
    }

    /// Path of the file backing shard `shard_id`
    pub fn shard_path(&self, shard_id: usize) -> PathBuf {
        self.base_path.join(format!("shard_{:04}.idx", shard_id))
    }
}
