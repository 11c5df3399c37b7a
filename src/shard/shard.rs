use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::postings::{ShardBatch, ShardPostings, TermPostings};
use crate::error::IndexError;
use crate::models::{DocumentId, Position};
use crate::persistence;
use crate::Result;

#[derive(Debug, Default)]
struct ShardState {
    postings: ShardPostings,
    dirty: bool,
}

#[derive(Serialize)]
struct ShardFileRef<'a> {
    shard_id: u32,
    postings: &'a ShardPostings,
}

#[derive(Deserialize)]
struct ShardFile {
    shard_id: u32,
    postings: ShardPostings,
}

/// One partition of the vocabulary.
///
/// All access to the postings goes through a single mutex; the dirty flag
/// lives under the same lock so `save` never misses an update.
pub struct Shard {
    id: usize,
    path: PathBuf,
    state: Mutex<ShardState>,
}

impl Shard {
    /// Create an empty shard backed by `path`
    pub fn new(id: usize, path: PathBuf) -> Self {
        Self {
            id,
            path,
            state: Mutex::new(ShardState::default()),
        }
    }

    /// Create a shard and restore it from `path` if the file exists
    pub fn open(id: usize, path: PathBuf) -> Result<Self> {
        let shard = Self::new(id, path);
        shard.load()?;
        Ok(shard)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one occurrence and mark the shard dirty
    pub fn update(&self, term: &str, doc_id: DocumentId, position: Position) {
        let mut state = self.state.lock();
        state.postings.insert(term, doc_id, position);
        state.dirty = true;
    }

    /// Apply a collect-phase buffer under a single lock acquisition.
    ///
    /// Returns the number of occurrences applied.
    pub fn apply(&self, batch: ShardBatch) -> usize {
        let entries = batch.len();
        if entries == 0 {
            return 0;
        }

        let mut state = self.state.lock();
        for (term, occurrences) in batch.into_terms() {
            state.postings.extend(term, occurrences);
        }
        state.dirty = true;
        entries
    }

    /// Persist the postings if they changed since the last save.
    ///
    /// Returns whether a file was written.
    pub fn save(&self) -> Result<bool> {
        let mut state = self.state.lock();
        if !state.dirty {
            return Ok(false);
        }

        let file = ShardFileRef {
            shard_id: self.id as u32,
            postings: &state.postings,
        };
        let bytes = persistence::write_file(&self.path, &file)?;
        state.dirty = false;

        debug!(
            shard = self.id,
            terms = state.postings.term_count(),
            bytes,
            "Saved shard"
        );
        Ok(true)
    }

    /// Replace the in-memory postings with the persisted file, if any.
    ///
    /// A missing file leaves the shard empty; an unreadable one is an error.
    pub fn load(&self) -> Result<()> {
        let Some(file) = persistence::read_file::<ShardFile>(&self.path)? else {
            return Ok(());
        };

        if file.shard_id as usize != self.id {
            return Err(IndexError::malformed(
                &self.path,
                format!("file holds shard {}, expected {}", file.shard_id, self.id),
            ));
        }

        let mut state = self.state.lock();
        state.postings = file.postings;
        state.dirty = false;

        debug!(shard = self.id, terms = state.postings.term_count(), "Loaded shard");
        Ok(())
    }

    /// Remove postings of documents rejected by `keep`, marking the shard
    /// dirty if anything was removed.
    pub fn retain_docs<F>(&self, keep: F) -> usize
    where
        F: FnMut(DocumentId) -> bool,
    {
        let mut state = self.state.lock();
        let removed = state.postings.retain_docs(keep);
        if removed > 0 {
            state.dirty = true;
        }
        removed
    }

    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    pub fn term_count(&self) -> usize {
        self.state.lock().postings.term_count()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.state.lock().postings.contains_term(term)
    }

    /// Document frequency and per-document occurrence counts for `term`
    pub fn term_postings(&self, term: &str) -> Option<TermPostings> {
        let state = self.state.lock();
        let docs = state.postings.get(term)?;
        Some(TermPostings {
            doc_frequency: docs.len(),
            occurrences: docs
                .iter()
                .map(|(&doc_id, positions)| (doc_id, positions.len() as u32))
                .collect(),
        })
    }

    /// Documents containing `term`, or `None` if the term is unknown
    pub fn doc_ids(&self, term: &str) -> Option<HashSet<DocumentId>> {
        let state = self.state.lock();
        state
            .postings
            .get(term)
            .map(|docs| docs.keys().copied().collect())
    }

    /// Positions of `term` in each of `docs` that contains it
    pub fn positions_for(
        &self,
        term: &str,
        docs: &[DocumentId],
    ) -> HashMap<DocumentId, Vec<Position>> {
        let state = self.state.lock();
        let Some(postings) = state.postings.get(term) else {
            return HashMap::new();
        };
        docs.iter()
            .filter_map(|doc_id| {
                postings
                    .get(doc_id)
                    .map(|positions| (*doc_id, positions.clone()))
            })
            .collect()
    }
}
