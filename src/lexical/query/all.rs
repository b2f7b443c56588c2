//! Queries that match every document or none.

use crate::error::Result;
use crate::lexical::query::Query;
use crate::lexical::query::matcher::{AllMatcher, EmptyMatcher, Matcher};
use crate::lexical::segment::Segment;
use crate::lexical::snapshot::IndexSnapshot;

/// Matches every document with a constant score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchAllQuery {
    score: f32,
}

impl MatchAllQuery {
    pub fn new() -> Self {
        MatchAllQuery { score: 1.0 }
    }

    pub fn with_score(score: f32) -> Self {
        MatchAllQuery { score }
    }
}

impl Default for MatchAllQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Query for MatchAllQuery {
    fn matcher<'a>(
        &'a self,
        _snapshot: &'a IndexSnapshot,
        segment: &'a Segment,
    ) -> Result<Box<dyn Matcher + 'a>> {
        Ok(Box::new(AllMatcher::new(segment.doc_count(), self.score)))
    }

    fn description(&self) -> String {
        "*:*".to_string()
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(*self)
    }
}

/// Matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchNoneQuery;

impl Query for MatchNoneQuery {
    fn matcher<'a>(
        &'a self,
        _snapshot: &'a IndexSnapshot,
        _segment: &'a Segment,
    ) -> Result<Box<dyn Matcher + 'a>> {
        Ok(Box::new(EmptyMatcher))
    }

    fn description(&self) -> String {
        "-*:*".to_string()
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(*self)
    }
}
