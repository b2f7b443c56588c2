//! Query types and evaluation.
//!
//! A query is evaluated one segment at a time. [`Query::matcher`] returns a
//! [`Matcher`] that walks the matching segment-local documents in ascending
//! order and reports a score for each. Corpus-wide statistics (document
//! count, document frequency) come from the snapshot the segment belongs to,
//! so scores are comparable across segments.

pub mod all;
pub mod boolean;
pub mod compiler;
pub mod matcher;
pub mod phrase;
pub mod range;

use std::fmt::Debug;

use crate::error::Result;
use crate::lexical::segment::Segment;
use crate::lexical::snapshot::IndexSnapshot;

pub use all::{MatchAllQuery, MatchNoneQuery};
pub use boolean::{BooleanClause, BooleanQuery, Occur};
pub use compiler::QueryCompiler;
pub use matcher::Matcher;
pub use phrase::PhraseQuery;
pub use range::{RangeBounds, RangeQuery};

/// A node of a query tree.
pub trait Query: Send + Sync + Debug {
    /// Matches of this query within `segment`, which belongs to `snapshot`.
    fn matcher<'a>(
        &'a self,
        snapshot: &'a IndexSnapshot,
        segment: &'a Segment,
    ) -> Result<Box<dyn Matcher + 'a>>;

    /// Human-readable rendering, used in logs.
    fn description(&self) -> String;

    fn clone_box(&self) -> Box<dyn Query>;
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
