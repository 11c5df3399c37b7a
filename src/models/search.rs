use serde::{Deserialize, Serialize};

use super::document::DocumentId;

pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Search result with relevance score
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: DocumentId,
    pub score: f64,
}

impl SearchHit {
    pub fn new(doc_id: DocumentId, score: f64) -> Self {
        Self { doc_id, score }
    }
}

/// Ranked search options
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Score with TF-IDF; when false every matching term contributes 1.0
    pub use_tfidf: bool,
    /// Maximum number of hits returned
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            use_tfidf: true,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl SearchOptions {
    /// Boolean-style relevance: count matching query terms
    pub fn boolean() -> Self {
        Self {
            use_tfidf: false,
            ..Default::default()
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_tfidf(mut self, use_tfidf: bool) -> Self {
        self.use_tfidf = use_tfidf;
        self
    }
}
