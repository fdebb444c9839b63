//! Token types for text analysis.
//!
//! A [`Token`] is the fundamental unit that flows through the analysis
//! pipeline: the token text plus its position in the stream.
//!
//! # Examples
//!
//! ```
//! use sagitta::analysis::token::Token;
//!
//! let token = Token::new("hello", 0);
//! assert_eq!(token.text, "hello");
//! assert_eq!(token.position, 0);
//! ```

use serde::{Deserialize, Serialize};

/// A token represents a single unit of text after tokenization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token's text content.
    pub text: String,

    /// Position in the token stream (0-based).
    pub position: usize,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
        }
    }
}

/// A boxed iterator of tokens produced by tokenizers and filters.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;
