//! Inverted index, query evaluation, and scoring.

pub mod posting;
pub mod query;
pub mod search;
pub mod segment;
pub mod snapshot;
pub mod store;

pub use query::{Query, QueryCompiler};
pub use search::{LexicalSearcher, ScoreDoc, TopDocs};
pub use snapshot::IndexSnapshot;
pub use store::{IndexStats, IndexStore};
