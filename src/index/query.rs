use std::collections::HashMap;

use rayon::prelude::*;

use super::index::ShardedIndex;
use crate::models::{DocumentId, SearchHit, SearchOptions};
use crate::persistence::CorpusMetadata;
use crate::scoring;
use crate::tokenizer::unique_terms;

/// Sort scores descending (ties by ascending document id) and keep the
/// first `max_results`.
pub fn rank_hits(scores: HashMap<DocumentId, f64>, max_results: usize) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = scores
        .into_iter()
        .map(|(doc_id, score)| SearchHit::new(doc_id, score))
        .collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
    hits.truncate(max_results);
    hits
}

impl ShardedIndex {
    /// Ranked search with TF-IDF scoring and at most 100 results
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        self.search_with(query, &SearchOptions::default())
    }

    /// Ranked search.
    ///
    /// Each distinct query term is scored on the worker pool against the
    /// single shard that owns it; partial scores are summed per document.
    /// A query with no terms after tokenization matches nothing.
    pub fn search_with(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        let terms = unique_terms(query);
        if terms.is_empty() || options.max_results == 0 {
            return Vec::new();
        }

        let metadata = self.metadata.read();
        if metadata.total_docs == 0 {
            return Vec::new();
        }

        let metadata = &*metadata;
        let partials: Vec<HashMap<DocumentId, f64>> = self.pool.install(|| {
            terms
                .par_iter()
                .map(|term| self.score_term(term, metadata, options.use_tfidf))
                .collect()
        });

        let mut scores: HashMap<DocumentId, f64> = HashMap::new();
        for partial in partials {
            for (doc_id, score) in partial {
                *scores.entry(doc_id).or_insert(0.0) += score;
            }
        }

        rank_hits(scores, options.max_results)
    }

    fn score_term(
        &self,
        term: &str,
        metadata: &CorpusMetadata,
        use_tfidf: bool,
    ) -> HashMap<DocumentId, f64> {
        let shard = &self.shards[self.router.shard_for(term)];
        let Some(postings) = shard.term_postings(term) else {
            return HashMap::new();
        };

        // Postings of a batch still being committed are not visible yet
        let visible: Vec<(DocumentId, u32, u32)> = postings
            .occurrences
            .into_iter()
            .filter_map(|(doc_id, occurrences)| {
                metadata
                    .doc_length(doc_id)
                    .map(|doc_len| (doc_id, occurrences, doc_len))
            })
            .collect();

        let idf = scoring::idf(metadata.total_docs, visible.len() as u64);

        let mut scores = HashMap::with_capacity(visible.len());
        for (doc_id, occurrences, doc_len) in visible {
            let score = if use_tfidf {
                scoring::tf_idf(occurrences, doc_len, idf)
            } else {
                1.0
            };
            scores.insert(doc_id, score);
        }
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_hits_orders_and_truncates() {
        let scores = HashMap::from([(1, 0.5), (2, 2.0), (3, 1.0), (4, 0.1)]);
        let hits = rank_hits(scores, 3);
        let ids: Vec<DocumentId> = hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_rank_hits_breaks_ties_by_doc_id() {
        let scores = HashMap::from([(9, 1.0), (3, 1.0), (5, 1.0)]);
        let ids: Vec<DocumentId> = rank_hits(scores, 10).iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![3, 5, 9]);
    }

    #[test]
    fn test_uncommitted_postings_do_not_affect_scores() {
        let tmp = tempfile::TempDir::new().unwrap();
        let index = ShardedIndex::open(
            crate::IndexConfig::new(tmp.path()).with_flush_after_ingest(false),
        )
        .unwrap();
        index
            .ingest(vec![(1, "quick fox"), (2, "lazy dog")])
            .unwrap();

        // Applied to the shard but not yet committed to the corpus metadata
        let shard = &index.shards[index.router.shard_for("quick")];
        for doc_id in 10..20 {
            shard.update("quick", doc_id, 0);
        }

        let hits = index.search("quick");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, 1);
        let expected = scoring::tf_idf(1, 2, scoring::idf(2, 1));
        assert_eq!(hits[0].score, expected);
        assert!(hits[0].score > 0.0);
    }

    #[test]
    fn test_rank_hits_zero_limit() {
        let scores = HashMap::from([(1, 1.0)]);
        assert!(rank_hits(scores, 0).is_empty());
    }
}
