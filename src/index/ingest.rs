use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{debug, warn};

use super::index::ShardedIndex;
use crate::models::{DocumentId, IngestReport};
use crate::persistence::CorpusMetadata;
use crate::shard::{ShardBatch, ShardRouter};
use crate::tokenizer::tokenize;
use crate::Result;

/// Output of the collect phase for one batch
#[derive(Debug)]
pub struct CollectedBatch {
    /// One buffer per shard, indexed by shard id
    pub shard_batches: Vec<ShardBatch>,
    /// Lengths of the documents new to the corpus, in input order
    pub lengths: Vec<(DocumentId, u32)>,
    /// Ids ignored because they were already ingested
    pub skipped: Vec<DocumentId>,
}

/// Tokenize a batch and group its occurrences by owning shard.
///
/// Touches no shard locks. Documents whose id is already in `metadata`, or
/// appeared earlier in the same batch, are skipped so a document's length
/// and positions are recorded exactly once.
pub fn collect_batch<S: AsRef<str>>(
    router: &ShardRouter,
    metadata: &CorpusMetadata,
    docs: &[(DocumentId, S)],
) -> CollectedBatch {
    let mut shard_batches: Vec<ShardBatch> =
        (0..router.shard_count()).map(|_| ShardBatch::new()).collect();
    let mut lengths = Vec::with_capacity(docs.len());
    let mut skipped = Vec::new();
    let mut seen = HashSet::with_capacity(docs.len());

    for (doc_id, content) in docs {
        let doc_id = *doc_id;
        if metadata.contains(doc_id) || !seen.insert(doc_id) {
            skipped.push(doc_id);
            continue;
        }

        let terms = tokenize(content.as_ref());
        lengths.push((doc_id, terms.len() as u32));

        for (position, term) in terms.into_iter().enumerate() {
            let shard_id = router.shard_for(&term);
            shard_batches[shard_id].push(term, doc_id, position as u32);
        }
    }

    CollectedBatch {
        shard_batches,
        lengths,
        skipped,
    }
}

impl ShardedIndex {
    /// Index a stream of `(doc_id, content)` pairs.
    ///
    /// Documents are processed in batches of `batch_size`. Each batch is
    /// tokenized and routed on the calling thread, then applied to the
    /// shards in parallel with one lock acquisition per shard. The corpus
    /// counters only advance once a batch has been fully applied.
    ///
    /// When `flush_after_ingest` is enabled all dirty state is persisted
    /// before returning. If that flush fails the error is returned, but
    /// every batch has already been committed in memory: the documents are
    /// searchable and counted, only not yet on disk. A later `flush` retries
    /// the write.
    pub fn ingest<I, S>(&self, documents: I) -> Result<IngestReport>
    where
        I: IntoIterator<Item = (DocumentId, S)>,
        S: AsRef<str>,
    {
        let _writer = self.writer.lock();
        let batch_size = self.config.batch_size;

        let mut report = IngestReport::default();
        let mut batch = Vec::with_capacity(batch_size);

        for doc in documents {
            batch.push(doc);
            if batch.len() >= batch_size {
                report.merge(self.process_batch(&batch));
                batch.clear();
            }
        }
        if !batch.is_empty() {
            report.merge(self.process_batch(&batch));
        }

        if self.config.flush_after_ingest {
            self.save_all()?;
        }

        debug!(
            indexed = report.indexed,
            skipped = report.skipped,
            batches = report.batches,
            "Ingest complete"
        );
        Ok(report)
    }

    /// Index a single document
    pub fn ingest_document(&self, doc_id: DocumentId, content: &str) -> Result<IngestReport> {
        self.ingest(std::iter::once((doc_id, content)))
    }

    fn process_batch<S: AsRef<str>>(&self, docs: &[(DocumentId, S)]) -> IngestReport {
        // Collect phase: single-threaded, no shard locks
        let collected = {
            let metadata = self.metadata.read();
            collect_batch(&self.router, &metadata, docs)
        };

        for &doc_id in &collected.skipped {
            warn!(doc_id, "Document id already ingested, skipping");
        }

        // Apply phase: one task per shard with buffered work
        let work: Vec<(usize, ShardBatch)> = collected
            .shard_batches
            .into_iter()
            .enumerate()
            .filter(|(_, batch)| !batch.is_empty())
            .collect();
        let touched = work.len();

        let shards = &self.shards;
        let applied: usize = self.pool.install(|| {
            work.into_par_iter()
                .map(|(shard_id, batch)| shards[shard_id].apply(batch))
                .sum()
        });

        if !collected.lengths.is_empty() {
            self.metadata.write().commit_batch(&collected.lengths);
            self.mark_metadata_dirty();
        }

        debug!(
            docs = collected.lengths.len(),
            occurrences = applied,
            shards = touched,
            "Applied batch"
        );

        IngestReport {
            indexed: collected.lengths.len(),
            skipped: collected.skipped.len(),
            batches: 1,
        }
    }
}
