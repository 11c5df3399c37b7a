use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::IndexError;
use crate::models::DocumentId;
use crate::shard::ROUTER_VERSION;
use crate::Result;

/// Corpus-level statistics shared by all shards
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusMetadata {
    /// Shard count the index was created with
    pub shard_count: u32,
    /// Routing function version the shard files were written with
    pub router_version: u32,
    /// Number of distinct documents ingested
    pub total_docs: u64,
    /// Token count of every ingested document
    pub doc_lengths: HashMap<DocumentId, u32>,
}

impl CorpusMetadata {
    pub fn new(shard_count: usize) -> Self {
        Self {
            shard_count: shard_count as u32,
            router_version: ROUTER_VERSION,
            total_docs: 0,
            doc_lengths: HashMap::new(),
        }
    }

    /// Ensure persisted metadata can be served with `shard_count` shards
    pub fn check_compatible(&self, shard_count: usize) -> Result<()> {
        if self.shard_count as usize != shard_count {
            return Err(IndexError::Configuration(format!(
                "index was created with {} shards, opened with {}",
                self.shard_count, shard_count
            )));
        }
        if self.router_version != ROUTER_VERSION {
            return Err(IndexError::Configuration(format!(
                "index uses router version {}, this build routes with version {}",
                self.router_version, ROUTER_VERSION
            )));
        }
        Ok(())
    }

    pub fn contains(&self, doc_id: DocumentId) -> bool {
        self.doc_lengths.contains_key(&doc_id)
    }

    pub fn doc_length(&self, doc_id: DocumentId) -> Option<u32> {
        self.doc_lengths.get(&doc_id).copied()
    }

    /// Record lengths for a batch of new documents and count them.
    pub fn commit_batch(&mut self, lengths: &[(DocumentId, u32)]) {
        for &(doc_id, len) in lengths {
            self.doc_lengths.insert(doc_id, len);
        }
        self.total_docs += lengths.len() as u64;
    }
}
