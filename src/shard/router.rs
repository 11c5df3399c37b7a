/// Version of the routing function. Persisted with the corpus metadata so
/// shard files are never served by a different mapping.
pub const ROUTER_VERSION: u32 = 1;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// 64-bit FNV-1a over raw bytes. Seedless, so stable across processes.
pub fn fnv1a_hash(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Index of the shard owning `term`.
///
/// # Panics
/// Panics if `shard_count` is zero.
pub fn shard_for(term: &str, shard_count: usize) -> usize {
    (fnv1a_hash(term.as_bytes()) % shard_count as u64) as usize
}

/// Routes terms to one of a fixed number of shards
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShardRouter {
    shard_count: usize,
}

impl ShardRouter {
    /// # Panics
    /// Panics if `shard_count` is zero.
    pub fn new(shard_count: usize) -> Self {
        assert!(shard_count > 0, "shard_count must be positive");
        Self { shard_count }
    }

    pub fn shard_for(&self, term: &str) -> usize {
        shard_for(term, self.shard_count)
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }
}
