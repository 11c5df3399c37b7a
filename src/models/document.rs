use serde::{Deserialize, Serialize};

/// Unique document identifier
pub type DocumentId = u64;

/// 0-based token offset within a document
pub type Position = u32;

/// Normalized (lower-case, ASCII-alphabetic) token; never empty
pub type Term = String;

/// Outcome of an ingestion call
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Documents newly added to the corpus
    pub indexed: usize,
    /// Documents ignored because their id was already ingested
    pub skipped: usize,
    /// Batches processed (including a partial final batch)
    pub batches: usize,
}

impl IngestReport {
    pub(crate) fn merge(&mut self, other: IngestReport) {
        self.indexed += other.indexed;
        self.skipped += other.skipped;
        self.batches += other.batches;
    }
}
