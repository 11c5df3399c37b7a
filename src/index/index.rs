use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::models::DocumentId;
use crate::persistence::{self, CorpusMetadata};
use crate::shard::{Shard, ShardRouter};
use crate::stats::IndexStats;

/// Sharded inverted index with positional postings and on-disk persistence.
///
/// All operations take `&self`, so the index can be shared behind an `Arc`.
/// Ingestion and flushing are serialized by an internal writer lock; searches
/// run concurrently with each other and with ingestion.
pub struct ShardedIndex {
    pub(crate) config: IndexConfig,
    pub(crate) router: ShardRouter,
    pub(crate) shards: Vec<Shard>,
    pub(crate) metadata: RwLock<CorpusMetadata>,
    metadata_dirty: AtomicBool,
    pub(crate) writer: Mutex<()>,
    pub(crate) pool: ThreadPool,
    closed: bool,
}

impl ShardedIndex {
    /// Open the index stored under `config.base_path`, creating the
    /// directory if needed.
    ///
    /// Missing files mean the index holds no data yet. A file that exists
    /// but cannot be decoded fails with `MalformedPersistedData`, and a
    /// directory written with a different shard count is rejected.
    pub fn open(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.base_path)?;

        let shard_count = config.shard_count;
        let (metadata, metadata_dirty) =
            match persistence::read_file::<CorpusMetadata>(&config.metadata_path())? {
                Some(metadata) => {
                    metadata.check_compatible(shard_count)?;
                    (metadata, false)
                }
                None => (CorpusMetadata::new(shard_count), true),
            };

        let shards = (0..shard_count)
            .map(|id| Shard::open(id, config.shard_path(id)))
            .collect::<Result<Vec<_>>>()?;

        // Postings saved ahead of a metadata write that never landed
        for shard in &shards {
            let removed = shard.retain_docs(|doc_id| metadata.contains(doc_id));
            if removed > 0 {
                warn!(
                    shard = shard.id(),
                    removed,
                    "Dropped postings of documents missing from corpus metadata"
                );
            }
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(shard_count)
            .thread_name(|i| format!("shard-worker-{}", i))
            .build()
            .map_err(|e| IndexError::WorkerPool(e.to_string()))?;

        info!(
            path = %config.base_path.display(),
            shards = shard_count,
            total_docs = metadata.total_docs,
            "Opened index"
        );

        Ok(Self {
            router: ShardRouter::new(shard_count),
            config,
            shards,
            metadata: RwLock::new(metadata),
            metadata_dirty: AtomicBool::new(metadata_dirty),
            writer: Mutex::new(()),
            pool,
            closed: false,
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Number of distinct documents ingested
    pub fn total_docs(&self) -> u64 {
        self.metadata.read().total_docs
    }

    /// Token count recorded for `doc_id` at ingestion
    pub fn doc_length(&self, doc_id: DocumentId) -> Option<u32> {
        self.metadata.read().doc_length(doc_id)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_docs: self.total_docs(),
            shard_count: self.shards.len(),
            terms_per_shard: self.shards.iter().map(|s| s.term_count()).collect(),
            dirty_shards: self.shards.iter().filter(|s| s.is_dirty()).count(),
        }
    }

    /// Persist corpus metadata and every dirty shard.
    ///
    /// On error, state written before the failure stays on disk and the rest
    /// remains dirty, so the flush can be retried.
    pub fn flush(&self) -> Result<()> {
        let _writer = self.writer.lock();
        self.save_all()
    }

    /// Flush and release the worker pool
    pub fn close(mut self) -> Result<()> {
        let result = self.flush();
        self.closed = true;
        info!(path = %self.config.base_path.display(), "Closed index");
        result
    }

    pub(crate) fn mark_metadata_dirty(&self) {
        self.metadata_dirty.store(true, Ordering::SeqCst);
    }

    /// Caller must hold the writer lock.
    pub(crate) fn save_all(&self) -> Result<()> {
        // Shards first: metadata never counts documents whose postings are not on disk
        let shards = &self.shards;
        let results: Vec<Result<bool>> =
            self.pool.install(|| shards.par_iter().map(|shard| shard.save()).collect());

        let mut written = 0;
        for result in results {
            if result? {
                written += 1;
            }
        }

        let mut metadata_written = false;
        if self.metadata_dirty.swap(false, Ordering::SeqCst) {
            let metadata = self.metadata.read();
            if let Err(e) = persistence::write_file(&self.config.metadata_path(), &*metadata) {
                self.mark_metadata_dirty();
                return Err(e);
            }
            metadata_written = true;
        }

        debug!(
            shards_written = written,
            metadata_written, "Flushed index"
        );
        Ok(())
    }
}

impl Drop for ShardedIndex {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.flush() {
            warn!(
                path = %self.config.base_path.display(),
                error = %e,
                "Failed to flush index on drop; data added this session may be lost"
            );
        }
    }
}
