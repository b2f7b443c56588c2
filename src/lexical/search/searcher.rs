//! Searcher implementation for executing queries against a snapshot.

use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::error::Result;
use crate::lexical::query::Query;
use crate::lexical::search::collector::{Collector, TopDocs, TopDocsCollector};
use crate::lexical::snapshot::IndexSnapshot;
use crate::util::cancel::{self, CancellationToken};

/// How many matches are collected between two cancellation checks.
const CANCEL_CHECK_INTERVAL: u64 = 256;

/// Executes queries against one immutable snapshot.
#[derive(Debug, Clone)]
pub struct LexicalSearcher {
    snapshot: Arc<IndexSnapshot>,
}

impl LexicalSearcher {
    pub fn new(snapshot: Arc<IndexSnapshot>) -> Self {
        LexicalSearcher { snapshot }
    }

    pub fn snapshot(&self) -> &Arc<IndexSnapshot> {
        &self.snapshot
    }

    /// Feed every match of `query` to `collector`, segment by segment, in
    /// global ordinal order.
    pub fn search_with_collector<C: Collector>(
        &self,
        query: &dyn Query,
        collector: &mut C,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        let mut seen = 0u64;
        for (base, segment) in self.snapshot.segments() {
            cancel::check(cancel)?;
            let mut matcher = query.matcher(&self.snapshot, segment)?;
            while let Some(doc) = matcher.doc_id() {
                collector.collect(base + doc, matcher.score())?;
                seen += 1;
                if seen % CANCEL_CHECK_INTERVAL == 0 {
                    cancel::check(cancel)?;
                }
                matcher.next();
            }
        }
        Ok(())
    }

    /// The `max_hits` best matches and the total match count.
    pub fn search(
        &self,
        query: &dyn Query,
        max_hits: usize,
        cancel: Option<&CancellationToken>,
    ) -> Result<TopDocs> {
        let start = Instant::now();
        let mut collector = TopDocsCollector::new(max_hits);
        self.search_with_collector(query, &mut collector, cancel)?;
        let top_docs = collector.into_top_docs();
        debug!(
            "query {} matched {} docs in generation {} ({:?})",
            query.description(),
            top_docs.total_hits,
            self.snapshot.generation(),
            start.elapsed()
        );
        Ok(top_docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, StandardAnalyzer};
    use crate::data::Document;
    use crate::error::MarqueeError;
    use crate::lexical::query::{MatchAllQuery, PhraseQuery};
    use crate::lexical::segment::{AnalyzedDocument, SegmentBuilder};

    fn segment(id: u64, texts: &[&str]) -> Arc<crate::lexical::segment::Segment> {
        let analyzer = StandardAnalyzer::new();
        let mut builder = SegmentBuilder::new(id);
        for text in texts {
            builder.add(AnalyzedDocument {
                stored: Document::new().with_field("title", *text),
                indexed: vec![(
                    "body".into(),
                    analyzer.analyze(text).map(|t| (t.text, t.position)).collect(),
                )],
            });
        }
        builder.build()
    }

    fn searcher() -> LexicalSearcher {
        LexicalSearcher::new(Arc::new(IndexSnapshot::new(
            2,
            vec![
                segment(0, &["dune", "arrival"]),
                segment(1, &["dune part two", "dune"]),
            ],
        )))
    }

    #[test]
    fn test_ranks_across_segments() {
        let query = PhraseQuery::new("body", vec!["dune".into()]);
        let top = searcher().search(&query, 10, None).unwrap();
        assert_eq!(top.total_hits, 3);
        let docs: Vec<u32> = top.score_docs.iter().map(|sd| sd.doc).collect();
        // Equal scores for the two single-word documents keep insertion order.
        assert_eq!(docs, vec![0, 3, 2]);
    }

    #[test]
    fn test_total_exceeds_max_hits() {
        let top = searcher().search(&MatchAllQuery::new(), 2, None).unwrap();
        assert_eq!(top.total_hits, 4);
        assert_eq!(top.score_docs.len(), 2);

        let none = searcher().search(&MatchAllQuery::new(), 0, None).unwrap();
        assert_eq!(none.total_hits, 4);
        assert!(none.score_docs.is_empty());
    }

    #[test]
    fn test_cancelled_search() {
        let token = CancellationToken::new();
        token.cancel();
        let err = searcher()
            .search(&MatchAllQuery::new(), 10, Some(&token))
            .unwrap_err();
        assert!(matches!(err, MarqueeError::Cancelled));
    }
}
