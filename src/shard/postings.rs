//! Positional postings for one shard
//!
//! `ShardPostings` is the persisted state of a shard:
//! term → document → ordered positions.
//! `ShardBatch` is the per-shard buffer filled by the single-threaded collect
//! phase of ingestion and drained under the shard lock in one pass.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{DocumentId, Position, Term};

/// Positions of one term, keyed by document
pub type DocPositions = HashMap<DocumentId, Vec<Position>>;

/// Term → posting list mapping owned by a shard
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardPostings {
    terms: HashMap<Term, DocPositions>,
}

impl ShardPostings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `position` to the posting list of (`term`, `doc_id`),
    /// creating the term and document entries when absent.
    pub fn insert(&mut self, term: &str, doc_id: DocumentId, position: Position) {
        if let Some(docs) = self.terms.get_mut(term) {
            docs.entry(doc_id).or_default().push(position);
            return;
        }
        let mut docs = DocPositions::new();
        docs.insert(doc_id, vec![position]);
        self.terms.insert(term.to_string(), docs);
    }

    /// Append every occurrence buffered for `term`, preserving buffer order
    pub fn extend(&mut self, term: Term, occurrences: Vec<(DocumentId, Position)>) {
        let docs = self.terms.entry(term).or_default();
        for (doc_id, position) in occurrences {
            docs.entry(doc_id).or_default().push(position);
        }
    }

    /// Drop every document for which `keep` is false, and any term left
    /// without documents. Returns the number of (term, document) entries
    /// removed.
    pub fn retain_docs<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(DocumentId) -> bool,
    {
        let mut removed = 0;
        self.terms.retain(|_, docs| {
            let before = docs.len();
            docs.retain(|&doc_id, _| keep(doc_id));
            removed += before - docs.len();
            !docs.is_empty()
        });
        removed
    }

    pub fn get(&self, term: &str) -> Option<&DocPositions> {
        self.terms.get(term)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Number of distinct documents containing `term`
    pub fn doc_frequency(&self, term: &str) -> usize {
        self.terms.get(term).map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.keys()
    }
}

/// Snapshot of one term's postings used for scoring
#[derive(Clone, Debug, PartialEq)]
pub struct TermPostings {
    /// Distinct documents containing the term
    pub doc_frequency: usize,
    /// (document, occurrence count) pairs
    pub occurrences: Vec<(DocumentId, u32)>,
}

/// Collect-phase buffer for one shard: term → (document, position) in
/// observation order.
#[derive(Debug, Default)]
pub struct ShardBatch {
    terms: HashMap<Term, Vec<(DocumentId, Position)>>,
    entries: usize,
}

impl ShardBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, term: Term, doc_id: DocumentId, position: Position) {
        self.terms.entry(term).or_default().push((doc_id, position));
        self.entries += 1;
    }

    /// Number of buffered (term, document, position) entries
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub(crate) fn into_terms(self) -> impl Iterator<Item = (Term, Vec<(DocumentId, Position)>)> {
        self.terms.into_iter()
    }
}
