use serde::{Deserialize, Serialize};

use crate::film::FilmHit;

/// A film search: a phrase plus optional filters and the page to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Free text, matched as a contiguous phrase.
    pub query: String,

    /// Zero-based page index.
    pub page: usize,

    /// Hits per page. Zero is treated as one.
    pub page_size: usize,

    /// Inclusive runtime bounds in minutes.
    pub min_runtime: Option<i32>,
    pub max_runtime: Option<i32>,

    /// Inclusive minimum vote average. Zero, negative, or NaN means no filter.
    pub min_vote_average: Option<f64>,

    /// Inclusive release-year bounds.
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn builder(query: impl Into<String>) -> SearchRequestBuilder {
        SearchRequestBuilder {
            request: SearchRequest::new(query),
        }
    }

    /// `page_size`, never below one.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.max(1)
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 0,
            page_size: 10,
            min_runtime: None,
            max_runtime: None,
            min_vote_average: None,
            start_year: None,
            end_year: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequestBuilder {
    request: SearchRequest,
}

impl SearchRequestBuilder {
    pub fn page(mut self, page: usize) -> Self {
        self.request.page = page;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.request.page_size = page_size;
        self
    }

    pub fn runtime(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.request.min_runtime = min;
        self.request.max_runtime = max;
        self
    }

    pub fn min_vote_average(mut self, min: f64) -> Self {
        self.request.min_vote_average = Some(min);
        self
    }

    pub fn years(mut self, start: Option<i32>, end: Option<i32>) -> Self {
        self.request.start_year = start;
        self.request.end_year = end;
        self
    }

    pub fn build(self) -> SearchRequest {
        self.request
    }
}

/// One page of results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultSet {
    /// All matching documents, independent of page size and of the top-K
    /// ceiling.
    pub total_hits: u64,
    /// The hits of the requested page, best first.
    pub hits: Vec<FilmHit>,
}

impl SearchResultSet {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
