//! # Marquee
//!
//! A small full-text search engine for film catalogs.
//!
//! ## Features
//!
//! - Phrase search over title, tagline and overview
//! - Runtime, vote-average and release-date filters
//! - TF-IDF ranking with a bounded top-K and an exact total count
//! - Snapshot-isolated reads and atomic batch commits
//! - Pluggable storage backends (in-memory or directory)
//!
//! ## Example
//!
//! ```
//! use marquee::{Engine, EngineConfig, FilmRecord, SearchRequest};
//!
//! let engine = Engine::open(EngineConfig::default()).unwrap();
//! engine
//!     .add_documents(vec![FilmRecord {
//!         id: "438631".into(),
//!         title: "Dune".into(),
//!         runtime: 155,
//!         ..FilmRecord::default()
//!     }])
//!     .unwrap();
//!
//! let result = engine.search(&SearchRequest::new("dune")).unwrap();
//! assert_eq!(result.total_hits, 1);
//! assert_eq!(result.hits[0].title, "Dune");
//! ```

// Core modules
pub mod analysis;
pub mod data;
pub mod engine;
mod error;
pub mod film;
pub mod ingest;
pub mod lexical;
pub mod storage;
pub mod util;

// Re-exports for the public API
pub use analysis::{Analyzer, StandardAnalyzer};
pub use data::{Document, FieldValue, Schema};
pub use engine::Engine;
pub use engine::config::{DateComparison, EmptyPhrase, EngineConfig, SearchConfig};
pub use engine::page::RankedHits;
pub use engine::search::{SearchRequest, SearchRequestBuilder, SearchResultSet};
pub use error::{MarqueeError, Result};
pub use film::{FilmHit, FilmRecord, RawFilmRecord};
pub use lexical::store::IndexStats;
pub use storage::{Storage, StorageConfig, StorageFactory};
pub use util::cancel::CancellationToken;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
