//! Tokenizers split raw text into word-like tokens.

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream};

/// Splits text into a stream of tokens with sequential positions.
pub trait Tokenizer: Send + Sync + std::fmt::Debug {
    fn tokenize<'a>(&self, text: &'a str) -> TokenStream<'a>;

    fn name(&self) -> &'static str;
}

/// Tokenizer following the Unicode word boundary rules (UAX #29).
///
/// Punctuation and whitespace are dropped; numbers and words with inner
/// apostrophes are kept whole.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeWordTokenizer;

impl UnicodeWordTokenizer {
    pub fn new() -> Self {
        UnicodeWordTokenizer
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> TokenStream<'a> {
        Box::new(
            text.unicode_word_indices()
                .enumerate()
                .map(|(position, (offset, word))| {
                    Token::new(word, position as u32, offset, offset + word.len())
                }),
        )
    }

    fn name(&self) -> &'static str {
        "unicode_word"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_punctuation() {
        let tokens: Vec<Token> = UnicodeWordTokenizer.tokenize("Dune: Part Two!").collect();
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["Dune", "Part", "Two"]);
        assert_eq!(tokens[2].position, 2);
        assert_eq!(tokens[1].start_offset, 6);
        assert_eq!(tokens[1].end_offset, 10);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(UnicodeWordTokenizer.tokenize("  ... ").count(), 0);
    }
}
