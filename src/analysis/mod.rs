//! Text analysis pipeline.
//!
//! This module provides the tokenization pipeline used by the sparse
//! retriever for corpus and query analysis. Text flows through a
//! [`Tokenizer`] and a chain of [`Filter`]s, composed by a
//! [`PipelineAnalyzer`].
//!
//! # Examples
//!
//! ```
//! use sagitta::analysis::{PipelineAnalyzer, StopWordPolicy};
//!
//! let analyzer = PipelineAnalyzer::standard(&StopWordPolicy::default()).unwrap();
//! let terms = analyzer.terms("The Quick Brown Fox").unwrap();
//! assert_eq!(terms, vec!["quick", "brown", "fox"]);
//! ```

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, PipelineAnalyzer};
pub use token::{Token, TokenStream};
pub use token_filter::{Filter, LowercaseFilter, StopFilter, StopWordPolicy};
pub use tokenizer::{Tokenizer, UnicodeWordTokenizer};
