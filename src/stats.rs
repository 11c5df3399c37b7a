use serde::{Deserialize, Serialize};

/// Point-in-time view of index size and persistence state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_docs: u64,
    pub shard_count: usize,
    /// Distinct terms held by each shard, indexed by shard id
    pub terms_per_shard: Vec<usize>,
    /// Shards with changes not yet written to disk
    pub dirty_shards: usize,
}

impl IndexStats {
    /// Vocabulary size across all shards
    pub fn total_terms(&self) -> usize {
        self.terms_per_shard.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_terms() {
        let stats = IndexStats {
            total_docs: 3,
            shard_count: 3,
            terms_per_shard: vec![4, 0, 2],
            dirty_shards: 1,
        };
        assert_eq!(stats.total_terms(), 6);
    }
}
