//! Analyzers combine a tokenizer with a chain of token filters.

use std::sync::Arc;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::{LowercaseFilter, NormalizeFilter, TokenFilter};
use crate::analysis::tokenizer::{Tokenizer, UnicodeWordTokenizer};

/// Turns free text into a stream of normalized tokens.
///
/// Each call to [`Analyzer::analyze`] returns a fresh, lazy stream, so the
/// sequence can be restarted by analyzing the same text again.
pub trait Analyzer: Send + Sync + std::fmt::Debug {
    fn analyze<'a>(&self, text: &'a str) -> TokenStream<'a>;

    fn name(&self) -> &'static str;

    /// Collect the normalized terms of `text` in order.
    fn terms(&self, text: &str) -> Vec<String> {
        self.analyze(text).map(|token: Token| token.text).collect()
    }
}

/// Unicode word tokenization followed by NFKC normalization and lower-casing.
///
/// No stemming and no stop-word removal: a phrase matches only where its
/// exact words appear.
#[derive(Debug, Clone)]
pub struct StandardAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn TokenFilter>>,
}

impl StandardAnalyzer {
    pub fn new() -> Self {
        StandardAnalyzer {
            tokenizer: Arc::new(UnicodeWordTokenizer::new()),
            filters: vec![Arc::new(NormalizeFilter), Arc::new(LowercaseFilter)],
        }
    }
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze<'a>(&self, text: &'a str) -> TokenStream<'a> {
        let mut stream = self.tokenizer.tokenize(text);
        for filter in &self.filters {
            stream = filter.filter(stream);
        }
        stream
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_terms() {
        let analyzer = StandardAnalyzer::new();
        assert_eq!(analyzer.terms("DUNE Part two"), analyzer.terms("dune part TWO"));
    }

    #[test]
    fn test_restartable() {
        let analyzer = StandardAnalyzer::new();
        let text = "The Spice Must Flow";
        let first: Vec<Token> = analyzer.analyze(text).collect();
        let second: Vec<Token> = analyzer.analyze(text).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_positions_are_sequential() {
        let analyzer = StandardAnalyzer::new();
        let positions: Vec<u32> = analyzer
            .analyze("a desert planet, Arrakis")
            .map(|t| t.position)
            .collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }
}
