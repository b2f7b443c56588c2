//! Token representation.

/// A single token produced by analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The (possibly normalized) token text.
    pub text: String,
    /// Zero-based position of the token within its source text.
    pub position: u32,
    /// Byte offset of the token start in the source text.
    pub start_offset: usize,
    /// Byte offset one past the token end in the source text.
    pub end_offset: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, position: u32, start_offset: usize, end_offset: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
        }
    }
}

/// A lazy stream of tokens borrowed from the analyzed text.
pub type TokenStream<'a> = Box<dyn Iterator<Item = Token> + 'a>;
