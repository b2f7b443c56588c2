//! Relevance scoring.

use std::fmt::Debug;

use crate::lexical::snapshot::IndexSnapshot;

/// Scores one matching document.
pub trait Scorer: Send + Sync + Debug {
    /// `freq` is how often the query matched in the field, `field_length`
    /// the field's token count.
    fn score(&self, freq: f32, field_length: u32) -> f32;
}

/// Classic vector-space TF-IDF.
///
/// `score = sqrt(freq) * Σ idf(t) * 1 / sqrt(field_length)` with
/// `idf(t) = 1 + ln(N / (df(t) + 1))`, where `N` and `df` are counted over
/// the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfIdfScorer {
    idf: f32,
}

impl TfIdfScorer {
    pub fn new(idf: f32) -> Self {
        TfIdfScorer { idf }
    }

    /// Scorer for a phrase made of `terms` in `field`.
    pub fn for_terms(snapshot: &IndexSnapshot, field: &str, terms: &[String]) -> Self {
        let doc_count = snapshot.doc_count();
        let idf = terms
            .iter()
            .map(|term| Self::idf(doc_count, snapshot.doc_freq(field, term)))
            .sum();
        TfIdfScorer { idf }
    }

    pub fn idf(doc_count: u32, doc_freq: u32) -> f32 {
        if doc_count == 0 {
            return 0.0;
        }
        1.0 + (doc_count as f32 / (doc_freq as f32 + 1.0)).ln()
    }
}

impl Scorer for TfIdfScorer {
    fn score(&self, freq: f32, field_length: u32) -> f32 {
        let tf = freq.sqrt();
        let norm = 1.0 / (field_length.max(1) as f32).sqrt();
        (tf * self.idf * norm).max(0.0)
    }
}
