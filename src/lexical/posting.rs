//! Postings: which documents contain a term, and where.

use ahash::AHashMap;

/// Occurrences of one term in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Segment-local document number.
    pub doc: u32,
    /// Ascending token positions of the term within the field.
    pub positions: Vec<u32>,
}

impl Posting {
    pub fn freq(&self) -> u32 {
        self.positions.len() as u32
    }
}

/// All postings of a term, ordered by document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    postings: Vec<Posting>,
}

impl PostingList {
    pub fn new(postings: Vec<Posting>) -> Self {
        debug_assert!(postings.windows(2).all(|w| w[0].doc < w[1].doc));
        PostingList { postings }
    }

    /// Number of documents containing the term.
    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    pub fn get(&self, doc: u32) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&doc, |p| p.doc)
            .ok()
            .map(|i| &self.postings[i])
    }
}

/// Inverted index of one field within one segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPostings {
    pub(crate) terms: AHashMap<String, PostingList>,
    /// Token count of the field, per segment-local document.
    pub(crate) lengths: Vec<u32>,
}

impl FieldPostings {
    pub fn postings(&self, term: &str) -> Option<&PostingList> {
        self.terms.get(term)
    }

    pub fn field_length(&self, doc: u32) -> u32 {
        self.lengths.get(doc as usize).copied().unwrap_or(0)
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }
}

/// Accumulates postings for one field as documents are added in order.
#[derive(Debug, Default)]
pub struct FieldPostingsBuilder {
    terms: AHashMap<String, Vec<Posting>>,
    lengths: Vec<u32>,
}

impl FieldPostingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the analyzed tokens `(term, position)` of document `doc`.
    ///
    /// Documents must be added in ascending order. A document missing the
    /// field can be skipped; its length is recorded as zero.
    pub fn add_document(&mut self, doc: u32, tokens: &[(String, u32)]) {
        let doc_index = doc as usize;
        if self.lengths.len() <= doc_index {
            self.lengths.resize(doc_index + 1, 0);
        }
        self.lengths[doc_index] = tokens.len() as u32;

        let mut per_term: AHashMap<&str, Vec<u32>> = AHashMap::new();
        for (term, position) in tokens {
            per_term.entry(term.as_str()).or_default().push(*position);
        }
        for (term, mut positions) in per_term {
            positions.sort_unstable();
            self.terms
                .entry(term.to_string())
                .or_default()
                .push(Posting { doc, positions });
        }
    }

    /// Finish the field, padding lengths to `doc_count` documents.
    pub fn build(mut self, doc_count: u32) -> FieldPostings {
        self.lengths.resize(doc_count as usize, 0);
        FieldPostings {
            terms: self
                .terms
                .into_iter()
                .map(|(term, postings)| (term, PostingList::new(postings)))
                .collect(),
            lengths: self.lengths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<(String, u32)> {
        text.split_whitespace()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i as u32))
            .collect()
    }

    #[test]
    fn test_build_postings() {
        let mut builder = FieldPostingsBuilder::new();
        builder.add_document(0, &tokens("dune part two dune"));
        builder.add_document(2, &tokens("arrival"));
        let field = builder.build(3);

        let dune = field.postings("dune").unwrap();
        assert_eq!(dune.doc_freq(), 1);
        assert_eq!(dune.get(0).unwrap().positions, vec![0, 3]);
        assert_eq!(dune.get(0).unwrap().freq(), 2);
        assert!(dune.get(2).is_none());

        assert_eq!(field.field_length(0), 4);
        assert_eq!(field.field_length(1), 0);
        assert_eq!(field.field_length(2), 1);
        assert_eq!(field.term_count(), 4);
        assert!(field.postings("missing").is_none());
    }
}
