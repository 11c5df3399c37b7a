//! Scoring functions for ranked search

/// Inverse document frequency: `ln(total_docs / doc_frequency)`
///
/// # Arguments
/// * `total_docs` - Number of documents in the corpus
/// * `doc_frequency` - Number of documents containing the term
///
/// # Returns
/// IDF weight, or 0.0 when either count is zero
pub fn idf(total_docs: u64, doc_frequency: u64) -> f64 {
    if total_docs == 0 || doc_frequency == 0 {
        return 0.0;
    }
    (total_docs as f64 / doc_frequency as f64).ln()
}

/// Term frequency normalized by document length
///
/// # Arguments
/// * `occurrences` - Times the term occurs in the document
/// * `doc_len` - Document length in tokens
pub fn term_frequency(occurrences: u32, doc_len: u32) -> f64 {
    if doc_len == 0 {
        return 0.0;
    }
    occurrences as f64 / doc_len as f64
}

/// TF-IDF contribution of one term to one document
pub fn tf_idf(occurrences: u32, doc_len: u32, idf: f64) -> f64 {
    term_frequency(occurrences, doc_len) * idf
}
