use std::collections::{BTreeSet, HashMap};

use super::index::ShardedIndex;
use crate::models::{DocumentId, Position};
use crate::shard::Shard;
use crate::tokenizer::tokenize;

/// Check whether `doc_id` contains the phrase whose per-term positions are
/// given in phrase order: term `i` must occur at `start + i` for some
/// position `start` of the first term.
///
/// Position lists are ascending, as ingestion appends them in token order.
pub fn matches_phrase(term_positions: &[HashMap<DocumentId, Vec<Position>>], doc_id: DocumentId) -> bool {
    let Some((first, rest)) = term_positions.split_first() else {
        return false;
    };
    let Some(starts) = first.get(&doc_id) else {
        return false;
    };

    starts.iter().any(|&start| {
        rest.iter().enumerate().all(|(offset, positions)| {
            let Some(expected) = start.checked_add(offset as Position + 1) else {
                return false;
            };
            positions
                .get(&doc_id)
                .map(|p| p.binary_search(&expected).is_ok())
                .unwrap_or(false)
        })
    })
}

impl ShardedIndex {
    /// Documents containing `phrase` as a contiguous run of terms.
    ///
    /// Candidates are the intersection of every term's document set; they
    /// are then position-checked in groups of `phrase_chunk_size`.
    pub fn phrase_search(&self, phrase: &str) -> BTreeSet<DocumentId> {
        let terms = tokenize(phrase);
        let Some((first, rest)) = terms.split_first() else {
            return BTreeSet::new();
        };

        let Some(mut candidates) = self.shard_of(first).doc_ids(first) else {
            return BTreeSet::new();
        };
        for term in rest {
            let Some(docs) = self.shard_of(term).doc_ids(term) else {
                return BTreeSet::new();
            };
            candidates.retain(|doc_id| docs.contains(doc_id));
            if candidates.is_empty() {
                return BTreeSet::new();
            }
        }

        let mut candidates: Vec<DocumentId> = {
            let metadata = self.metadata.read();
            candidates
                .into_iter()
                .filter(|&doc_id| metadata.contains(doc_id))
                .collect()
        };
        candidates.sort_unstable();

        let mut results = BTreeSet::new();
        for chunk in candidates.chunks(self.config.phrase_chunk_size) {
            let term_positions: Vec<HashMap<DocumentId, Vec<Position>>> = terms
                .iter()
                .map(|term| self.shard_of(term).positions_for(term, chunk))
                .collect();

            results.extend(
                chunk
                    .iter()
                    .copied()
                    .filter(|&doc_id| matches_phrase(&term_positions, doc_id)),
            );
        }
        results
    }

    fn shard_of(&self, term: &str) -> &Shard {
        &self.shards[self.router.shard_for(term)]
    }
}
