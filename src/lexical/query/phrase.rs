//! Phrase query: an exact, contiguous sequence of terms.

use crate::analysis::Analyzer;
use crate::error::Result;
use crate::lexical::posting::{FieldPostings, Posting};
use crate::lexical::query::Query;
use crate::lexical::query::matcher::{EmptyMatcher, Matcher};
use crate::lexical::search::scorer::{Scorer, TfIdfScorer};
use crate::lexical::segment::Segment;
use crate::lexical::snapshot::IndexSnapshot;

/// Matches documents whose `field` contains `terms` at consecutive positions.
///
/// The score grows with the number of times the whole phrase occurs, not
/// with occurrences of its individual terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseQuery {
    field: String,
    terms: Vec<String>,
}

impl PhraseQuery {
    pub fn new<S: Into<String>>(field: S, terms: Vec<String>) -> Self {
        PhraseQuery {
            field: field.into(),
            terms,
        }
    }

    /// Analyze `text` the same way indexed text is analyzed.
    pub fn parse<S: Into<String>>(field: S, text: &str, analyzer: &dyn Analyzer) -> Self {
        Self::new(field, analyzer.terms(text))
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Query for PhraseQuery {
    fn matcher<'a>(
        &'a self,
        snapshot: &'a IndexSnapshot,
        segment: &'a Segment,
    ) -> Result<Box<dyn Matcher + 'a>> {
        if self.terms.is_empty() {
            return Ok(Box::new(EmptyMatcher));
        }
        let Some(field) = segment.field(&self.field) else {
            return Ok(Box::new(EmptyMatcher));
        };

        let mut lists = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            match field.postings(term) {
                Some(list) => lists.push(list.postings()),
                None => return Ok(Box::new(EmptyMatcher)),
            }
        }

        let scorer = TfIdfScorer::for_terms(snapshot, &self.field, &self.terms);
        Ok(Box::new(PhraseMatcher::new(lists, field, scorer)))
    }

    fn description(&self) -> String {
        format!("{}:\"{}\"", self.field, self.terms.join(" "))
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

/// Intersects the postings of all phrase terms, then checks positions.
struct PhraseMatcher<'a> {
    lists: Vec<&'a [Posting]>,
    cursors: Vec<usize>,
    field: &'a FieldPostings,
    scorer: TfIdfScorer,
    current: Option<(u32, f32)>,
}

impl<'a> PhraseMatcher<'a> {
    fn new(lists: Vec<&'a [Posting]>, field: &'a FieldPostings, scorer: TfIdfScorer) -> Self {
        let cursors = vec![0; lists.len()];
        let mut matcher = PhraseMatcher {
            lists,
            cursors,
            field,
            scorer,
            current: None,
        };
        matcher.current = matcher.find_from(0);
        matcher
    }

    /// Move the cursor of list `i` to its first posting with `doc >= target`.
    fn seek(&mut self, i: usize, target: u32) -> Option<&'a Posting> {
        let list = self.lists[i];
        let start = self.cursors[i];
        self.cursors[i] = start + list[start..].partition_point(|p| p.doc < target);
        list.get(self.cursors[i])
    }

    fn find_from(&mut self, target: u32) -> Option<(u32, f32)> {
        let mut target = target;
        loop {
            let lead = self.seek(0, target)?;
            let doc = lead.doc;
            let mut candidate = vec![lead];
            let mut next_target = doc + 1;

            for i in 1..self.lists.len() {
                let posting = self.seek(i, doc)?;
                if posting.doc != doc {
                    next_target = posting.doc;
                    candidate.clear();
                    break;
                }
                candidate.push(posting);
            }

            if !candidate.is_empty() {
                let freq = phrase_freq(&candidate);
                if freq > 0 {
                    let score = self
                        .scorer
                        .score(freq as f32, self.field.field_length(doc));
                    return Some((doc, score));
                }
            }
            target = next_target;
        }
    }
}

/// Number of positions where every term follows its predecessor directly.
fn phrase_freq(postings: &[&Posting]) -> u32 {
    let Some((first, rest)) = postings.split_first() else {
        return 0;
    };
    first
        .positions
        .iter()
        .filter(|&&start| {
            rest.iter().enumerate().all(|(offset, posting)| {
                start
                    .checked_add(offset as u32 + 1)
                    .is_some_and(|pos| posting.positions.binary_search(&pos).is_ok())
            })
        })
        .count() as u32
}

impl Matcher for PhraseMatcher<'_> {
    fn doc_id(&self) -> Option<u32> {
        self.current.map(|(doc, _)| doc)
    }

    fn next(&mut self) -> Option<u32> {
        let (doc, _) = self.current?;
        self.current = self.find_from(doc + 1);
        self.doc_id()
    }

    fn advance(&mut self, target: u32) -> Option<u32> {
        let (doc, _) = self.current?;
        if doc < target {
            self.current = self.find_from(target);
        }
        self.doc_id()
    }

    fn score(&self) -> f32 {
        self.current.map_or(0.0, |(_, score)| score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StandardAnalyzer;
    use crate::data::Document;
    use crate::lexical::segment::{AnalyzedDocument, SegmentBuilder};

    fn snapshot(texts: &[&str]) -> IndexSnapshot {
        let analyzer = StandardAnalyzer::new();
        let mut builder = SegmentBuilder::new(0);
        for text in texts {
            let tokens = analyzer.analyze(text).map(|t| (t.text, t.position)).collect();
            builder.add(AnalyzedDocument {
                stored: Document::new(),
                indexed: vec![("body".into(), tokens)],
            });
        }
        IndexSnapshot::new(1, vec![builder.build()])
    }

    fn run(snapshot: &IndexSnapshot, query: &PhraseQuery) -> Vec<(u32, f32)> {
        let mut out = Vec::new();
        for (_, segment) in snapshot.segments() {
            let mut m = query.matcher(snapshot, segment).unwrap();
            while let Some(doc) = m.doc_id() {
                out.push((doc, m.score()));
                m.next();
            }
        }
        out
    }

    fn phrase(text: &str) -> PhraseQuery {
        PhraseQuery::parse("body", text, &StandardAnalyzer::new())
    }

    #[test]
    fn test_requires_contiguous_terms() {
        let snap = snapshot(&[
            "the spice must flow",
            "must the spice flow",
            "spice spice must flow must",
        ]);
        let docs: Vec<u32> = run(&snap, &phrase("Spice must"))
            .into_iter()
            .map(|(d, _)| d)
            .collect();
        assert_eq!(docs, vec![0, 2]);
    }

    #[test]
    fn test_repeated_phrase_scores_higher() {
        let snap = snapshot(&["dune dune one two", "dune x y z"]);
        let hits = run(&snap, &phrase("dune"));
        assert_eq!(hits.len(), 2);
        assert!(hits[0].1 > hits[1].1);
    }

    #[test]
    fn test_repeated_term_in_phrase() {
        let snap = snapshot(&["new york new new", "new york"]);
        let hits = run(&snap, &phrase("new new"));
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_missing_term_or_field() {
        let snap = snapshot(&["dune part two"]);
        assert!(run(&snap, &phrase("dune arrakis")).is_empty());
        assert!(run(&snap, &PhraseQuery::new("title", vec!["dune".into()])).is_empty());
        assert!(run(&snap, &phrase("")).is_empty());
    }

    #[test]
    fn test_advance() {
        let snap = snapshot(&["a b", "x", "a b", "a b"]);
        let q = phrase("a b");
        let segment = snap.segments().next().unwrap().1;
        let mut m = q.matcher(&snap, segment).unwrap();
        assert_eq!(m.doc_id(), Some(0));
        assert_eq!(m.advance(1), Some(2));
        assert_eq!(m.advance(2), Some(2));
        assert_eq!(m.next(), Some(3));
        assert_eq!(m.next(), None);
    }

    #[test]
    fn test_description() {
        assert_eq!(phrase("Dune Part").description(), "body:\"dune part\"");
    }
}
