//! Point-in-time views of the index.

use std::sync::Arc;

use ahash::AHashSet;

use crate::data::Document;
use crate::lexical::segment::Segment;

/// An immutable view of every segment committed as of one generation.
///
/// Documents are addressed by a global ordinal: segments are laid end to end
/// in commit order, so ordinals follow insertion order across the whole
/// index. Writers never touch a snapshot once it is published; a new commit
/// produces a new snapshot instead.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    generation: u64,
    segments: Vec<Arc<Segment>>,
    bases: Vec<u32>,
    doc_count: u32,
}

impl IndexSnapshot {
    pub fn new(generation: u64, segments: Vec<Arc<Segment>>) -> Self {
        let mut bases = Vec::with_capacity(segments.len());
        let mut doc_count = 0u32;
        for segment in &segments {
            bases.push(doc_count);
            doc_count += segment.doc_count();
        }
        IndexSnapshot {
            generation,
            segments,
            bases,
            doc_count,
        }
    }

    pub fn empty(generation: u64) -> Self {
        Self::new(generation, Vec::new())
    }

    /// Commit generation this snapshot was taken at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn doc_count(&self) -> u32 {
        self.doc_count
    }

    pub fn is_empty(&self) -> bool {
        self.doc_count == 0
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segments with the global ordinal of their first document.
    pub fn segments(&self) -> impl Iterator<Item = (u32, &Arc<Segment>)> {
        self.bases.iter().copied().zip(self.segments.iter())
    }

    /// Number of documents whose `field` contains `term`.
    pub fn doc_freq(&self, field: &str, term: &str) -> u32 {
        self.segments.iter().map(|s| s.doc_freq(field, term)).sum()
    }

    /// Stored fields of the document with global ordinal `doc`.
    pub fn document(&self, doc: u32) -> Option<&Document> {
        let idx = self.bases.partition_point(|&base| base <= doc).checked_sub(1)?;
        self.segments[idx].document(doc - self.bases[idx])
    }

    /// Distinct terms over all indexed fields.
    pub fn term_count(&self) -> usize {
        let mut terms = AHashSet::new();
        for segment in &self.segments {
            for (field, postings) in segment.fields() {
                for term in postings.terms() {
                    terms.insert((field, term));
                }
            }
        }
        terms.len()
    }
}
