//! Text analysis for indexing and querying.
//!
//! The pipeline follows a simple flow:
//!
//! ```text
//! Text → Tokenizer → Token Stream → Token Filters → Analyzed Tokens
//! ```
//!
//! The same [`Analyzer`] must be applied to document text at index time and
//! to the search phrase at query time, so that tokens compare equal regardless
//! of casing or Unicode composition.
//!
//! # Examples
//!
//! ```
//! use marquee::analysis::{Analyzer, StandardAnalyzer};
//!
//! let analyzer = StandardAnalyzer::new();
//! let terms: Vec<String> = analyzer.analyze("Dune: Part Two").map(|t| t.text).collect();
//! assert_eq!(terms, vec!["dune", "part", "two"]);
//! ```

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, StandardAnalyzer};
pub use token::{Token, TokenStream};
pub use token_filter::{LowercaseFilter, NormalizeFilter, TokenFilter};
pub use tokenizer::{Tokenizer, UnicodeWordTokenizer};
