//! Boolean query implementation for combining multiple queries.
//!
//! Only conjunction is supported: every clause must match.

use crate::error::Result;
use crate::lexical::query::Query;
use crate::lexical::query::matcher::{ConjunctionMatcher, EmptyMatcher, Matcher};
use crate::lexical::segment::Segment;
use crate::lexical::snapshot::IndexSnapshot;

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match and contributes to the score.
    Must,
    /// The clause must match but does not contribute to scoring.
    Filter,
}

/// A clause in a boolean query.
#[derive(Debug)]
pub struct BooleanClause {
    pub query: Box<dyn Query>,
    pub occur: Occur,
}

impl Clone for BooleanClause {
    fn clone(&self) -> Self {
        BooleanClause {
            query: self.query.clone_box(),
            occur: self.occur,
        }
    }
}

impl BooleanClause {
    pub fn new(query: Box<dyn Query>, occur: Occur) -> Self {
        BooleanClause { query, occur }
    }

    pub fn must(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::Must)
    }

    pub fn filter(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::Filter)
    }
}

/// A conjunction of clauses. An empty boolean query matches nothing.
#[derive(Debug, Clone, Default)]
pub struct BooleanQuery {
    clauses: Vec<BooleanClause>,
}

impl BooleanQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_clause(&mut self, clause: BooleanClause) {
        self.clauses.push(clause);
    }

    /// Add a MUST clause.
    pub fn add_must(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::must(query));
    }

    /// Add a FILTER clause (matches like Must but does not affect scoring).
    pub fn add_filter(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::filter(query));
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl Query for BooleanQuery {
    fn matcher<'a>(
        &'a self,
        snapshot: &'a IndexSnapshot,
        segment: &'a Segment,
    ) -> Result<Box<dyn Matcher + 'a>> {
        if self.clauses.is_empty() {
            return Ok(Box::new(EmptyMatcher));
        }
        let mut subs = Vec::with_capacity(self.clauses.len());
        for clause in &self.clauses {
            let matcher = clause.query.matcher(snapshot, segment)?;
            if matcher.doc_id().is_none() {
                return Ok(Box::new(EmptyMatcher));
            }
            subs.push((matcher, clause.occur == Occur::Must));
        }
        Ok(Box::new(ConjunctionMatcher::new(subs)))
    }

    fn description(&self) -> String {
        self.clauses
            .iter()
            .map(|c| match c.occur {
                Occur::Must => format!("+{}", c.query.description()),
                Occur::Filter => format!("#{}", c.query.description()),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}
