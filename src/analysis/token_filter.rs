//! Token filters transform a token stream.

use unicode_normalization::UnicodeNormalization;

use crate::analysis::token::TokenStream;

/// Transforms a token stream into another token stream.
pub trait TokenFilter: Send + Sync + std::fmt::Debug {
    fn filter<'a>(&self, tokens: TokenStream<'a>) -> TokenStream<'a>;

    fn name(&self) -> &'static str;
}

/// Lower-cases token text using full Unicode case mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowercaseFilter;

impl TokenFilter for LowercaseFilter {
    fn filter<'a>(&self, tokens: TokenStream<'a>) -> TokenStream<'a> {
        Box::new(tokens.map(|mut token| {
            if token.text.chars().any(char::is_uppercase) {
                token.text = token.text.to_lowercase();
            }
            token
        }))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

/// Applies NFKC normalization so that compatibility forms (ligatures,
/// full-width letters, precomposed vs. combining accents) compare equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeFilter;

impl TokenFilter for NormalizeFilter {
    fn filter<'a>(&self, tokens: TokenStream<'a>) -> TokenStream<'a> {
        Box::new(tokens.map(|mut token| {
            token.text = token.text.nfkc().collect();
            token
        }))
    }

    fn name(&self) -> &'static str {
        "nfkc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    fn stream(words: &[&str]) -> TokenStream<'static> {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i as u32, 0, w.len()))
            .collect();
        Box::new(tokens.into_iter())
    }

    #[test]
    fn test_lowercase() {
        let out: Vec<String> = LowercaseFilter
            .filter(stream(&["DUNE", "Ärger"]))
            .map(|t| t.text)
            .collect();
        assert_eq!(out, vec!["dune", "ärger"]);
    }

    #[test]
    fn test_nfkc_folds_compatibility_forms() {
        let out: Vec<String> = NormalizeFilter
            .filter(stream(&["ﬁlm", "Ｄｕｎｅ"]))
            .map(|t| t.text)
            .collect();
        assert_eq!(out, vec!["film", "Dune"]);
    }
}
