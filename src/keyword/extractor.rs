//! Statistical keyword extraction adapter.
//!
//! Extraction itself is delegated to an external statistical extractor
//! behind the [`KeywordExtractor`] trait; [`YakeExtractor`] binds the
//! `yake-rust` crate as the default backend. Scores follow the YAKE
//! convention: lower score = better keyword.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use yake_rust::{Config, StopWords, get_n_best};

use crate::error::{Result, SagittaError};

/// A keyword extracted from text with its raw extractor score.
///
/// Lower score = more important (YAKE convention). Uniqueness of keyword
/// text is not guaranteed by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// The keyword text.
    pub text: String,

    /// Raw extractor score, lower = better.
    pub score: f64,
}

impl Keyword {
    /// Create a new keyword.
    pub fn new<S: Into<String>>(text: S, score: f64) -> Self {
        Keyword {
            text: text.into(),
            score,
        }
    }
}

/// Candidate deduplication algorithm used by the extractor backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DedupAlgorithm {
    /// Sequence-matcher similarity.
    #[default]
    Seqm,
    /// Jaro-Winkler similarity.
    Jaro,
    /// Levenshtein distance ratio.
    Levenshtein,
}

/// Configuration for a single extraction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// ISO 639 language code used for stop word selection.
    pub language: String,

    /// Maximum n-gram size of extracted keywords (>= 1).
    pub max_ngram_size: usize,

    /// Candidate deduplication threshold (0.0-1.0).
    pub dedup_threshold: f64,

    /// Candidate deduplication algorithm.
    pub dedup_algorithm: DedupAlgorithm,

    /// Co-occurrence window size in words.
    pub window_size: usize,

    /// Maximum number of keywords to return (>= 1).
    pub num_keywords: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            max_ngram_size: 2,
            dedup_threshold: 0.85,
            dedup_algorithm: DedupAlgorithm::Seqm,
            window_size: 30,
            num_keywords: 25,
        }
    }
}

impl ExtractorConfig {
    /// Set the maximum n-gram size.
    pub fn with_max_ngram_size(mut self, size: usize) -> Self {
        self.max_ngram_size = size;
        self
    }

    /// Set the number of keywords to return.
    pub fn with_num_keywords(mut self, num: usize) -> Self {
        self.num_keywords = num;
        self
    }

    /// Validate the configuration, naming the offending parameter.
    pub fn validate(&self) -> Result<()> {
        if self.max_ngram_size < 1 {
            return Err(SagittaError::invalid_argument(
                "max_ngram_size must be at least 1",
            ));
        }
        if self.num_keywords < 1 {
            return Err(SagittaError::invalid_argument(
                "num_keywords must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.dedup_threshold) {
            return Err(SagittaError::invalid_argument(
                "dedup_threshold must be between 0.0 and 1.0",
            ));
        }

        Ok(())
    }
}

/// Trait for statistical keyword extractors.
///
/// Implementations return keywords ordered by the backend's own ranking,
/// each with a raw score where lower = better.
pub trait KeywordExtractor: Send + Sync {
    /// Extract keywords from text using the given configuration.
    fn extract(&self, text: &str, config: &ExtractorConfig) -> Result<Vec<Keyword>>;

    /// Get the name of this extractor (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// Keyword extractor backed by the YAKE algorithm (`yake-rust`).
///
/// # Examples
///
/// ```
/// use sagitta::keyword::extractor::{ExtractorConfig, KeywordExtractor, YakeExtractor};
///
/// let extractor = YakeExtractor::new();
/// let keywords = extractor
///     .extract(
///         "Rust is a systems programming language focused on safety.",
///         &ExtractorConfig::default(),
///     )
///     .unwrap();
/// assert!(!keywords.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct YakeExtractor;

impl YakeExtractor {
    /// Create a new YAKE extractor.
    pub fn new() -> Self {
        YakeExtractor
    }

    fn stop_words(language: &str) -> StopWords {
        StopWords::predefined(language)
            .or_else(|| StopWords::predefined("en"))
            .unwrap_or_else(|| StopWords::custom(HashSet::new()))
    }
}

impl KeywordExtractor for YakeExtractor {
    fn extract(&self, text: &str, config: &ExtractorConfig) -> Result<Vec<Keyword>> {
        config.validate()?;

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let stop_words = Self::stop_words(&config.language);
        let yake_config = Config {
            ngrams: config.max_ngram_size,
            remove_duplicates: true,
            deduplication_threshold: config.dedup_threshold,
            ..Config::default()
        };

        let results = get_n_best(config.num_keywords, text, &stop_words, &yake_config);

        Ok(results
            .into_iter()
            .map(|item| Keyword::new(item.keyword, item.score))
            .collect())
    }

    fn name(&self) -> &'static str {
        "yake"
    }
}
