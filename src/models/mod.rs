pub mod document;
pub mod search;

pub use document::{DocumentId, IngestReport, Position, Term};
pub use search::{SearchHit, SearchOptions};
