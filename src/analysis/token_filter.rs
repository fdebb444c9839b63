//! Token filter implementations.
//!
//! Filters transform a token stream after tokenization: lowercasing for
//! case-insensitive matching, stop word removal, and so on. Filters are
//! chained by [`PipelineAnalyzer`](crate::analysis::analyzer::PipelineAnalyzer).

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::token::TokenStream;
use crate::error::{Result, SagittaError};

/// Default English stop words list.
///
/// Common English words that are typically filtered out during indexing.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Trait for token filters that transform a token stream.
pub trait Filter: Send + Sync {
    /// Filter the given token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// A filter that converts token text to lowercase.
///
/// # Examples
///
/// ```
/// use sagitta::analysis::token::Token;
/// use sagitta::analysis::token_filter::{Filter, LowercaseFilter};
///
/// let filter = LowercaseFilter::new();
/// let tokens = vec![Token::new("The", 0), Token::new("QUICK", 1)];
/// let result: Vec<_> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
/// assert_eq!(result[0].text, "the");
/// assert_eq!(result[1].text, "quick");
/// ```
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered = tokens.map(|mut token| {
            token.text = token.text.to_lowercase();
            token
        });

        Ok(Box::new(filtered))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

/// Stop word selection for corpus and query analysis.
///
/// Either an ISO 639 language code resolved against the built-in lists, an
/// explicit custom word list, or no stop word removal at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopWordPolicy {
    /// Use the built-in stop word list for the given ISO 639 code.
    Language(String),
    /// Use an explicit list of stop words.
    Custom(Vec<String>),
    /// Do not remove stop words.
    None,
}

impl Default for StopWordPolicy {
    fn default() -> Self {
        StopWordPolicy::Language("en".to_string())
    }
}

/// A filter that removes common words (stop words) from a token stream.
///
/// Comparison is case-insensitive: the stop list is lowercased on
/// construction and matched against lowercased token text.
#[derive(Clone, Debug)]
pub struct StopFilter {
    words: Arc<HashSet<String>>,
}

impl StopFilter {
    /// Create a stop filter using the default English stop words.
    pub fn new() -> Self {
        Self::with_words(DEFAULT_ENGLISH_STOP_WORDS.iter().copied())
    }

    /// Create a stop filter from an explicit word list.
    pub fn with_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();

        StopFilter {
            words: Arc::new(words),
        }
    }

    /// Create a stop filter for the given ISO 639 language code.
    ///
    /// Only English ("en") ships a built-in list; unknown codes are
    /// rejected so a typo never silently disables stop word removal.
    pub fn for_language(code: &str) -> Result<Self> {
        match code {
            "en" | "english" => Ok(Self::new()),
            other => Err(SagittaError::invalid_argument(format!(
                "stop_words: no built-in stop word list for language '{other}'"
            ))),
        }
    }

    /// Build a stop filter from a [`StopWordPolicy`].
    ///
    /// Returns `None` when the policy disables stop word removal.
    pub fn from_policy(policy: &StopWordPolicy) -> Result<Option<Self>> {
        match policy {
            StopWordPolicy::Language(code) => Ok(Some(Self::for_language(code)?)),
            StopWordPolicy::Custom(words) => Ok(Some(Self::with_words(words.iter()))),
            StopWordPolicy::None => Ok(None),
        }
    }

    /// Check whether a word is in the stop list.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let words = Arc::clone(&self.words);
        let filtered = tokens.filter(move |token| !words.contains(&token.text.to_lowercase()));

        Ok(Box::new(filtered))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    fn stream(words: &[&str]) -> TokenStream {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i))
            .collect();
        Box::new(tokens.into_iter())
    }

    #[test]
    fn test_lowercase_filter() {
        let filter = LowercaseFilter::new();
        let result: Vec<_> = filter
            .filter(stream(&["Hello", "WORLD"]))
            .unwrap()
            .collect();

        assert_eq!(result[0].text, "hello");
        assert_eq!(result[1].text, "world");
    }

    #[test]
    fn test_stop_filter_default_english() {
        let filter = StopFilter::new();
        let result: Vec<_> = filter
            .filter(stream(&["the", "quick", "brown", "fox"]))
            .unwrap()
            .collect();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].text, "quick");
    }

    #[test]
    fn test_stop_filter_case_insensitive() {
        let filter = StopFilter::new();
        let result: Vec<_> = filter.filter(stream(&["The", "Fox"])).unwrap().collect();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "Fox");
    }

    #[test]
    fn test_stop_filter_custom_words() {
        let filter = StopFilter::with_words(["foo", "bar"]);
        assert!(filter.is_stop_word("FOO"));
        assert!(!filter.is_stop_word("baz"));
    }

    #[test]
    fn test_stop_filter_unknown_language() {
        let result = StopFilter::for_language("xx");
        assert!(result.is_err());
    }

    #[test]
    fn test_policy_none() {
        let filter = StopFilter::from_policy(&StopWordPolicy::None).unwrap();
        assert!(filter.is_none());
    }
}
