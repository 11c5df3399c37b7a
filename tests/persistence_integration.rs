//! Flush, reopen and recovery behaviour of the on-disk index.

use std::collections::BTreeSet;
use std::fs;

use shardex_search::{
    shard_for, DocumentId, IndexConfig, IndexError, SearchOptions, ShardedIndex,
};
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn corpus() -> Vec<(DocumentId, &'static str)> {
    vec![
        (1, "the quick brown fox jumps over the lazy dog"),
        (2, "a quick brown dog outpaces a quick red fox"),
        (3, "lazy afternoons in the sun"),
        (4, "the dog and the fox are friends"),
        (5, ""),
    ]
}

#[test]
fn flush_then_reopen_preserves_results() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::new(tmp.path())
        .with_shard_count(4)
        .with_flush_after_ingest(false);

    let queries = ["quick", "lazy dog", "fox the", "friends"];
    let phrases = ["quick brown", "the lazy dog", "the fox", "brown quick"];

    let (ranked, boolean, phrase) = {
        let index = ShardedIndex::open(config.clone()).unwrap();
        index.ingest(corpus()).unwrap();
        index.flush().unwrap();

        let ranked: Vec<_> = queries.iter().map(|q| index.search(q)).collect();
        let boolean: Vec<_> = queries
            .iter()
            .map(|q| index.search_with(q, &SearchOptions::boolean()))
            .collect();
        let phrase: Vec<_> = phrases.iter().map(|p| index.phrase_search(p)).collect();
        index.close().unwrap();
        (ranked, boolean, phrase)
    };

    let index = ShardedIndex::open(config).unwrap();
    assert_eq!(index.total_docs(), 5);
    assert_eq!(index.doc_length(1), Some(9));
    assert_eq!(index.doc_length(5), Some(0));

    for (i, q) in queries.iter().enumerate() {
        assert_eq!(index.search(q), ranked[i], "ranked {:?}", q);
        assert_eq!(
            index.search_with(q, &SearchOptions::boolean()),
            boolean[i],
            "boolean {:?}",
            q
        );
    }
    for (i, p) in phrases.iter().enumerate() {
        assert_eq!(index.phrase_search(p), phrase[i], "phrase {:?}", p);
    }
    assert!(phrase[3].is_empty());
}

#[test]
fn ingest_auto_flushes_by_default() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::new(tmp.path());

    let index = ShardedIndex::open(config.clone()).unwrap();
    index.ingest(corpus()).unwrap();
    assert_eq!(index.stats().dirty_shards, 0);
    assert!(config.metadata_path().exists());

    // A second handle sees the flushed state without the first closing
    let reader = ShardedIndex::open(config.clone()).unwrap();
    assert_eq!(reader.total_docs(), 5);
    assert_eq!(reader.search("friends")[0].doc_id, 4);
    reader.close().unwrap();
    index.close().unwrap();
}

#[test]
fn only_owning_shard_files_are_written() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::new(tmp.path()).with_shard_count(16);

    let index = ShardedIndex::open(config.clone()).unwrap();
    index.ingest_document(1, "solitary").unwrap();

    let owner = shard_for("solitary", 16);
    for id in 0..16 {
        assert_eq!(config.shard_path(id).exists(), id == owner, "shard {}", id);
    }
}

#[test]
fn ingest_continues_after_reopen() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::new(tmp.path()).with_shard_count(3);

    {
        let index = ShardedIndex::open(config.clone()).unwrap();
        index.ingest(vec![(1, "rust search engine"), (2, "python search")]).unwrap();
    }

    let index = ShardedIndex::open(config).unwrap();
    let report = index
        .ingest(vec![(2, "duplicate"), (3, "rust systems")])
        .unwrap();
    assert_eq!(report.indexed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(index.total_docs(), 3);

    let mut hits: Vec<DocumentId> = index
        .search_with("rust", &SearchOptions::boolean())
        .iter()
        .map(|h| h.doc_id)
        .collect();
    hits.sort_unstable();
    assert_eq!(hits, vec![1, 3]);
    assert_eq!(index.phrase_search("search engine").len(), 1);
}

#[test]
fn corrupt_shard_file_fails_open() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::new(tmp.path()).with_shard_count(2);

    let owner = {
        let index = ShardedIndex::open(config.clone()).unwrap();
        index.ingest_document(1, "corruptible").unwrap();
        shard_for("corruptible", 2)
    };

    let path = config.shard_path(owner);
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&path, bytes).unwrap();

    match ShardedIndex::open(config) {
        Err(IndexError::MalformedPersistedData { path: reported, .. }) => {
            assert_eq!(reported, path)
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("corrupt shard accepted"),
    }
}

#[test]
fn truncated_metadata_fails_open() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::new(tmp.path());

    {
        let index = ShardedIndex::open(config.clone()).unwrap();
        index.ingest(corpus()).unwrap();
    }

    let path = config.metadata_path();
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let err = ShardedIndex::open(config).err().unwrap();
    assert!(matches!(err, IndexError::MalformedPersistedData { .. }));
    assert!(!err.is_retriable());
}

#[test]
fn empty_directory_opens_empty_index() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let index = ShardedIndex::open(IndexConfig::new(tmp.path())).unwrap();

    assert_eq!(index.total_docs(), 0);
    assert!(index.search("anything").is_empty());
    assert!(index.phrase_search("anything at all").is_empty());
    index.close().unwrap();

    let index = ShardedIndex::open(IndexConfig::new(tmp.path())).unwrap();
    assert_eq!(index.total_docs(), 0);
}

#[test]
fn lost_metadata_does_not_double_postings() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::new(tmp.path()).with_shard_count(4);
    let docs = vec![(1, "quick brown fox"), (2, "slow dog")];

    let (before, phrase_before) = {
        let index = ShardedIndex::open(config.clone()).unwrap();
        index.ingest(docs.clone()).unwrap();
        let result = (index.search("quick"), index.phrase_search("quick brown"));
        index.close().unwrap();
        result
    };
    assert!((before[0].score - 2f64.ln() / 3.0).abs() < 1e-12);

    // Shard files survive, the corpus metadata does not
    fs::remove_file(config.metadata_path()).unwrap();

    let index = ShardedIndex::open(config.clone()).unwrap();
    assert_eq!(index.total_docs(), 0);
    assert_eq!(index.stats().total_terms(), 0);
    assert!(index.search("quick").is_empty());

    let report = index.ingest(docs).unwrap();
    assert_eq!(report.indexed, 2);
    assert_eq!(index.search("quick"), before);
    assert_eq!(index.phrase_search("quick brown"), phrase_before);
    index.close().unwrap();

    let index = ShardedIndex::open(config).unwrap();
    assert_eq!(index.search("quick"), before);
}

#[test]
fn stale_metadata_drops_uncounted_postings() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::new(tmp.path()).with_shard_count(2);
    let stale = tmp.path().join("metadata.stale");

    {
        let index = ShardedIndex::open(config.clone()).unwrap();
        index.ingest(vec![(1, "quick fox"), (2, "lazy dog")]).unwrap();
        fs::copy(config.metadata_path(), &stale).unwrap();
        index.ingest_document(3, "quick quick cat").unwrap();
    }

    // Shards hold doc 3, metadata predates it
    fs::rename(&stale, config.metadata_path()).unwrap();

    let index = ShardedIndex::open(config).unwrap();
    assert_eq!(index.total_docs(), 2);
    assert!(index.phrase_search("quick quick").is_empty());

    let hits = index.search("quick");
    assert_eq!(hits.len(), 1);
    assert!(hits[0].score > 0.0);

    index.ingest_document(3, "quick quick cat").unwrap();
    let hits = index.search("quick");
    let doc3 = hits.iter().find(|h| h.doc_id == 3).unwrap();
    let expected = (2.0 / 3.0) * (3f64 / 2.0).ln();
    assert!((doc3.score - expected).abs() < 1e-12);
    assert_eq!(index.phrase_search("quick quick"), BTreeSet::from([3]));
}

#[test]
fn failed_auto_flush_keeps_documents_in_memory() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::new(tmp.path()).with_shard_count(4);
    let index = ShardedIndex::open(config.clone()).unwrap();

    // A directory where the shard's temp file would go makes the save fail
    let blocker = config
        .shard_path(shard_for("unsaved", 4))
        .with_extension("tmp");
    fs::create_dir(&blocker).unwrap();

    let err = index.ingest_document(1, "unsaved").err().unwrap();
    assert!(matches!(err, IndexError::Io(_)));
    assert!(err.is_retriable());

    assert_eq!(index.total_docs(), 1);
    assert_eq!(index.search("unsaved")[0].doc_id, 1);
    assert!(index.stats().dirty_shards > 0);

    fs::remove_dir(&blocker).unwrap();
    index.flush().unwrap();
    assert_eq!(index.stats().dirty_shards, 0);
    index.close().unwrap();

    let index = ShardedIndex::open(config).unwrap();
    assert_eq!(index.total_docs(), 1);
    assert_eq!(index.search("unsaved")[0].doc_id, 1);
}
