use std::sync::Arc;

use crate::engine::search::SearchResultSet;
use crate::film::FilmHit;
use crate::lexical::search::ScoreDoc;
use crate::lexical::snapshot::IndexSnapshot;

/// The ranked outcome of one search execution.
///
/// Holds the snapshot it was computed on, so every page is cut from the same
/// ranking and resolved against the same stored documents, however many
/// commits happen in between.
#[derive(Debug, Clone)]
pub struct RankedHits {
    snapshot: Arc<IndexSnapshot>,
    score_docs: Vec<ScoreDoc>,
    total_hits: u64,
}

impl RankedHits {
    pub(crate) fn new(
        snapshot: Arc<IndexSnapshot>,
        score_docs: Vec<ScoreDoc>,
        total_hits: u64,
    ) -> Self {
        RankedHits {
            snapshot,
            score_docs,
            total_hits,
        }
    }

    /// Every matching document, including those ranked past the ceiling.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// Number of reachable (ranked) hits.
    pub fn len(&self) -> usize {
        self.score_docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.score_docs.is_empty()
    }

    pub fn score_docs(&self) -> &[ScoreDoc] {
        &self.score_docs
    }

    /// Pages needed to show every reachable hit.
    pub fn page_count(&self, page_size: usize) -> usize {
        self.score_docs.len().div_ceil(page_size.max(1))
    }

    /// Hits `[page * page_size, page * page_size + page_size)`, clipped to
    /// the ranked list. A page past the end is empty. A page size of zero is
    /// treated as one.
    pub fn page(&self, page: usize, page_size: usize) -> SearchResultSet {
        let page_size = page_size.max(1);
        let start = page.saturating_mul(page_size).min(self.score_docs.len());
        let end = start.saturating_add(page_size).min(self.score_docs.len());

        let hits = self.score_docs[start..end]
            .iter()
            .filter_map(|sd| {
                self.snapshot
                    .document(sd.doc)
                    .map(|doc| FilmHit::from_document(doc, sd.score))
            })
            .collect();

        SearchResultSet {
            total_hits: self.total_hits,
            hits,
        }
    }
}
