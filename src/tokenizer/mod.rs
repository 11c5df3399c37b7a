//! Text normalization shared by ingestion and querying.

mod tokenizer;

pub use tokenizer::{term_frequencies, tokenize, tokenize_with_positions, unique_terms};
