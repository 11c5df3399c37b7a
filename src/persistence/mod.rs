//! Persistence primitives: the compressed file codec shared by shard and
//! metadata files, and the corpus metadata record.

mod codec;
mod metadata;

pub use codec::{decode, encode, read_file, write_file, FORMAT_VERSION, MAGIC};
pub use metadata::CorpusMetadata;
