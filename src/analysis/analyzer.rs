//! Analyzer implementations that combine tokenizers and filters.

use std::sync::Arc;

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{Filter, LowercaseFilter, StopFilter, StopWordPolicy};
use crate::analysis::tokenizer::{Tokenizer, UnicodeWordTokenizer};
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// A configurable analyzer that combines a tokenizer with a chain of filters.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sagitta::analysis::analyzer::{Analyzer, PipelineAnalyzer};
/// use sagitta::analysis::token_filter::LowercaseFilter;
/// use sagitta::analysis::tokenizer::UnicodeWordTokenizer;
///
/// let analyzer = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
///     .add_filter(Arc::new(LowercaseFilter::new()));
///
/// let tokens: Vec<_> = analyzer.analyze("Hello World").unwrap().collect();
/// assert_eq!(tokens[0].text, "hello");
/// ```
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            tokenizer,
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Create the standard analysis pipeline: Unicode word tokenization,
    /// lowercasing, then stop word removal per the given policy.
    pub fn standard(stop_words: &StopWordPolicy) -> Result<Self> {
        let mut analyzer = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()));

        if let Some(stop_filter) = StopFilter::from_policy(stop_words)? {
            analyzer = analyzer.add_filter(Arc::new(stop_filter));
        }

        Ok(analyzer)
    }

    /// Analyze text and collect the resulting token texts.
    pub fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut stream = self.tokenizer.tokenize(text)?;
        for filter in &self.filters {
            stream = filter.filter(stream)?;
        }

        Ok(stream)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}
