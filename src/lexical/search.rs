//! Query execution: scoring, top-K collection, and the searcher loop.

pub mod collector;
pub mod scorer;
pub mod searcher;

pub use collector::{Collector, ScoreDoc, TopDocs, TopDocsCollector};
pub use scorer::{Scorer, TfIdfScorer};
pub use searcher::LexicalSearcher;
