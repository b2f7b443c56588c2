//! Collectors receive every match of a search.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::error::Result;

/// A document and its score. `doc` is the global ordinal in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDoc {
    pub doc: u32,
    pub score: f32,
}

/// Ranked matches plus the number of documents that matched in total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopDocs {
    /// Every match, including those beyond the top-K cutoff.
    pub total_hits: u64,
    /// Best first.
    pub score_docs: Vec<ScoreDoc>,
}

/// Receives matches in ascending document order.
pub trait Collector {
    fn collect(&mut self, doc: u32, score: f32) -> Result<()>;

    fn total_hits(&self) -> u64;
}

/// Heap entry ordered so that the greatest entry is the best hit: higher
/// score first, then earlier insertion.
#[derive(Debug, Clone, Copy)]
struct Ranked(ScoreDoc);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .score
            .total_cmp(&other.0.score)
            .then_with(|| other.0.doc.cmp(&self.0.doc))
    }
}

/// Keeps the `k` best hits in a bounded min-heap.
///
/// Collecting `n` matches costs `O(n log k)`; the full candidate set is
/// never sorted. The total count keeps growing after the heap is full.
#[derive(Debug)]
pub struct TopDocsCollector {
    k: usize,
    heap: BinaryHeap<Reverse<Ranked>>,
    total_hits: u64,
}

impl TopDocsCollector {
    pub fn new(k: usize) -> Self {
        TopDocsCollector {
            k,
            heap: BinaryHeap::with_capacity(k.min(1024) + 1),
            total_hits: 0,
        }
    }

    pub fn into_top_docs(self) -> TopDocs {
        TopDocs {
            total_hits: self.total_hits,
            score_docs: self
                .heap
                .into_sorted_vec()
                .into_iter()
                .map(|Reverse(Ranked(sd))| sd)
                .collect(),
        }
    }
}

impl Collector for TopDocsCollector {
    fn collect(&mut self, doc: u32, score: f32) -> Result<()> {
        self.total_hits += 1;
        if self.k == 0 {
            return Ok(());
        }
        let entry = Ranked(ScoreDoc { doc, score });
        if self.heap.len() < self.k {
            self.heap.push(Reverse(entry));
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if entry > worst.0 {
                *worst = Reverse(entry);
            }
        }
        Ok(())
    }

    fn total_hits(&self) -> u64 {
        self.total_hits
    }
}
