//! Turns a [`SearchRequest`] into a query tree.
//!
//! The compiled tree is always a conjunction: the phrase clause scores, every
//! other clause only filters. Compilation never fails; out-of-range request
//! values are clamped or dropped.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::analysis::Analyzer;
use crate::engine::config::{DateComparison, EmptyPhrase, SearchConfig};
use crate::engine::search::SearchRequest;
use crate::film::{COMBINED_TEXT_FIELD, RELEASE_DATE_FIELD, RUNTIME_FIELD, VOTE_AVERAGE_FIELD};
use crate::lexical::query::{
    BooleanQuery, MatchAllQuery, MatchNoneQuery, PhraseQuery, Query, RangeQuery,
};

/// Highest possible vote average.
pub const MAX_VOTE_AVERAGE: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct QueryCompiler {
    analyzer: Arc<dyn Analyzer>,
    config: SearchConfig,
}

impl QueryCompiler {
    pub fn new(analyzer: Arc<dyn Analyzer>, config: SearchConfig) -> Self {
        QueryCompiler { analyzer, config }
    }

    /// Compile against today's local date.
    pub fn compile(&self, request: &SearchRequest) -> BooleanQuery {
        self.compile_at(request, Local::now().date_naive())
    }

    /// Compile with an explicit "today", the upper limit of date ranges.
    pub fn compile_at(&self, request: &SearchRequest, today: NaiveDate) -> BooleanQuery {
        let mut query = BooleanQuery::new();
        query.add_must(self.phrase_clause(&request.query));
        query.add_filter(Box::new(RangeQuery::int_range(
            RUNTIME_FIELD,
            request.min_runtime,
            request.max_runtime,
        )));

        if let Some(min) = request.min_vote_average.filter(|v| *v > 0.0) {
            query.add_filter(Box::new(RangeQuery::double_range(
                VOTE_AVERAGE_FIELD,
                min,
                MAX_VOTE_AVERAGE,
            )));
        }

        if let Some(clause) = self.date_clause(request.start_year, request.end_year, today) {
            query.add_filter(clause);
        }

        query
    }

    fn phrase_clause(&self, text: &str) -> Box<dyn Query> {
        let phrase = PhraseQuery::parse(COMBINED_TEXT_FIELD, text, self.analyzer.as_ref());
        if !phrase.is_empty() {
            return Box::new(phrase);
        }
        match self.config.empty_phrase {
            EmptyPhrase::MatchAll => Box::new(MatchAllQuery::new()),
            EmptyPhrase::MatchNone => Box::new(MatchNoneQuery),
        }
    }

    fn date_clause(
        &self,
        start_year: Option<i32>,
        end_year: Option<i32>,
        today: NaiveDate,
    ) -> Option<Box<dyn Query>> {
        if start_year.is_none() && end_year.is_none() {
            return None;
        }
        let query = match self.config.date_comparison {
            DateComparison::Chronological => {
                let lower = start_year.and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
                let upper = end_year
                    .and_then(|y| NaiveDate::from_ymd_opt(y, 12, 31))
                    .map_or(today, |end| end.min(today));
                RangeQuery::date_range(RELEASE_DATE_FIELD, lower, Some(upper))
            }
            DateComparison::Lexicographic => RangeQuery::ordinal_range(
                RELEASE_DATE_FIELD,
                start_year.map(|y| y.to_string()),
                end_year.map(|y| y.to_string()),
            ),
        };
        Some(Box::new(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StandardAnalyzer;

    fn compiler(config: SearchConfig) -> QueryCompiler {
        QueryCompiler::new(Arc::new(StandardAnalyzer::new()), config)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn describe(config: SearchConfig, request: &SearchRequest) -> String {
        compiler(config).compile_at(request, today()).description()
    }

    #[test]
    fn test_phrase_and_default_runtime() {
        let request = SearchRequest::new("Dune: Part TWO");
        assert_eq!(
            describe(SearchConfig::default(), &request),
            format!(
                "+combined_text:\"dune part two\" #runtime:[{} TO {}]",
                i32::MIN,
                i32::MAX
            )
        );
    }

    #[test]
    fn test_vote_clause_only_when_positive() {
        let mut request = SearchRequest::builder("dune")
            .runtime(Some(0), Some(999))
            .min_vote_average(0.0)
            .build();
        let without = describe(SearchConfig::default(), &request);
        assert!(!without.contains("vote_average"));

        request.min_vote_average = Some(f64::NAN);
        assert!(!describe(SearchConfig::default(), &request).contains("vote_average"));

        request.min_vote_average = Some(7.5);
        assert!(describe(SearchConfig::default(), &request).contains("#vote_average:[7.5 TO 10]"));
    }

    #[test]
    fn test_chronological_dates_cap_at_today() {
        let request = SearchRequest::builder("x")
            .years(Some(2000), Some(2030))
            .build();
        assert!(
            describe(SearchConfig::default(), &request)
                .ends_with("#release_date:[2000-01-01 TO 2025-06-01]")
        );

        let request = SearchRequest::builder("x").years(None, Some(2010)).build();
        assert!(
            describe(SearchConfig::default(), &request)
                .ends_with("#release_date:[* TO 2010-12-31]")
        );

        let request = SearchRequest::builder("x").years(Some(2020), None).build();
        assert!(
            describe(SearchConfig::default(), &request)
                .ends_with("#release_date:[2020-01-01 TO 2025-06-01]")
        );

        let request = SearchRequest::new("x");
        assert!(!describe(SearchConfig::default(), &request).contains("release_date"));
    }

    #[test]
    fn test_lexicographic_dates_use_year_strings() {
        let config = SearchConfig {
            date_comparison: DateComparison::Lexicographic,
            ..SearchConfig::default()
        };
        let request = SearchRequest::builder("x")
            .years(Some(2000), Some(2024))
            .build();
        assert!(describe(config, &request).ends_with("#release_date:[2000 TO 2024]"));
    }

    #[test]
    fn test_empty_phrase_policy() {
        let request = SearchRequest::new("  ...  ");
        assert!(describe(SearchConfig::default(), &request).starts_with("+*:*"));

        let config = SearchConfig {
            empty_phrase: EmptyPhrase::MatchNone,
            ..SearchConfig::default()
        };
        assert!(describe(config, &request).starts_with("+-*:*"));
    }
}
