//! N-gram goodness optimization.
//!
//! Runs keyword extraction at multiple n-gram granularities and scores each
//! granularity by combining average keyword quality with a redundancy
//! penalty. The granularity with the highest goodness is the best n-gram
//! size for downstream keyword use.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::keyword::extractor::{DedupAlgorithm, ExtractorConfig, KeywordExtractor};
use crate::keyword::overlap::{DEFAULT_JACCARD_THRESHOLD, overlap_score};

/// Weights combining keyword quality and overlap into a goodness score.
///
/// Both default to `1.0`; each component is scaled by its weight before
/// the two are multiplied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GoodnessWeights {
    /// Multiplier for the average-quality component.
    pub yake_weight: f64,

    /// Multiplier for the overlap component.
    pub overlap_weight: f64,
}

impl Default for GoodnessWeights {
    fn default() -> Self {
        Self {
            yake_weight: 1.0,
            overlap_weight: 1.0,
        }
    }
}

/// Configuration for the n-gram goodness optimizer.
///
/// The extraction parameters are fixed across all tested granularities so
/// that the goodness scores compare only the n-gram size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// ISO 639 language code for extraction.
    pub language: String,

    /// Candidate deduplication threshold for extraction.
    pub dedup_threshold: f64,

    /// Candidate deduplication algorithm for extraction.
    pub dedup_algorithm: DedupAlgorithm,

    /// Co-occurrence window size for extraction.
    pub window_size: usize,

    /// Number of keywords extracted per granularity.
    pub num_keywords: usize,

    /// Jaccard threshold used by the overlap component.
    pub jaccard_threshold: f64,

    /// Component weights for the goodness combination.
    pub weights: GoodnessWeights,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            dedup_threshold: 0.85,
            dedup_algorithm: DedupAlgorithm::Seqm,
            window_size: 30,
            num_keywords: 25,
            jaccard_threshold: DEFAULT_JACCARD_THRESHOLD,
            weights: GoodnessWeights::default(),
        }
    }
}

impl OptimizerConfig {
    /// Set the component weights.
    pub fn with_weights(mut self, weights: GoodnessWeights) -> Self {
        self.weights = weights;
        self
    }

    fn extractor_config(&self, ngram_size: usize) -> ExtractorConfig {
        ExtractorConfig {
            language: self.language.clone(),
            max_ngram_size: ngram_size,
            dedup_threshold: self.dedup_threshold,
            dedup_algorithm: self.dedup_algorithm,
            window_size: self.window_size,
            num_keywords: self.num_keywords,
        }
    }
}

/// Default n-gram sizes tested by [`NgramOptimizer::optimize_default`].
pub const DEFAULT_NGRAM_SIZES: &[usize] = &[2, 3, 4];

/// Scores n-gram granularities for a text by extraction quality and
/// redundancy.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sagitta::keyword::extractor::YakeExtractor;
/// use sagitta::keyword::optimizer::NgramOptimizer;
///
/// let optimizer = NgramOptimizer::new(Arc::new(YakeExtractor::new()));
/// let goodness = optimizer
///     .optimize("Hybrid retrieval combines sparse and dense search.", &[2, 3])
///     .unwrap();
/// assert_eq!(goodness.len(), 2);
/// ```
pub struct NgramOptimizer {
    extractor: Arc<dyn KeywordExtractor>,
    config: OptimizerConfig,
}

impl NgramOptimizer {
    /// Create an optimizer with the default configuration.
    pub fn new(extractor: Arc<dyn KeywordExtractor>) -> Self {
        Self::with_config(extractor, OptimizerConfig::default())
    }

    /// Create an optimizer with a custom configuration.
    pub fn with_config(extractor: Arc<dyn KeywordExtractor>, config: OptimizerConfig) -> Self {
        Self { extractor, config }
    }

    /// Compute one goodness score per requested n-gram size.
    ///
    /// Output order matches `ngram_sizes` order. A granularity whose
    /// extraction yields no keywords scores `0.0`.
    pub fn optimize(&self, text: &str, ngram_sizes: &[usize]) -> Result<Vec<f64>> {
        let mut goodness_scores = Vec::with_capacity(ngram_sizes.len());

        for &ngram_size in ngram_sizes {
            let extractor_config = self.config.extractor_config(ngram_size);
            let keywords = self.extractor.extract(text, &extractor_config)?;

            if keywords.is_empty() {
                goodness_scores.push(0.0);
                continue;
            }

            let average_score =
                keywords.iter().map(|k| k.score).sum::<f64>() / keywords.len() as f64;
            // Averages outside the unit interval are treated as worst case.
            let average_score = if !(0.0..=1.0).contains(&average_score) {
                1.0
            } else {
                average_score
            };
            let quality = (1.0 - average_score).clamp(0.0, 1.0);

            let overlap = overlap_score(&keywords, self.config.jaccard_threshold);

            let weights = self.config.weights;
            goodness_scores.push((weights.yake_weight * quality) * (weights.overlap_weight * overlap));
        }

        Ok(goodness_scores)
    }

    /// Compute goodness scores for the default granularities (2, 3, 4).
    pub fn optimize_default(&self, text: &str) -> Result<Vec<f64>> {
        self.optimize(text, DEFAULT_NGRAM_SIZES)
    }

    /// Pick the n-gram size with the highest goodness for a text.
    ///
    /// Ties go to the smaller size. Returns `None` for an empty size list.
    pub fn best_ngram_size(&self, text: &str, ngram_sizes: &[usize]) -> Result<Option<usize>> {
        let goodness_scores = self.optimize(text, ngram_sizes)?;

        let best = ngram_sizes
            .iter()
            .zip(goodness_scores.iter())
            .max_by(|(size_a, score_a), (size_b, score_b)| {
                score_a
                    .partial_cmp(score_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(size_b.cmp(size_a))
            })
            .map(|(size, _)| *size);

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::extractor::Keyword;

    /// Extractor returning a fixed keyword set per n-gram size.
    struct FixedExtractor;

    impl KeywordExtractor for FixedExtractor {
        fn extract(&self, _text: &str, config: &ExtractorConfig) -> Result<Vec<Keyword>> {
            let keywords = match config.max_ngram_size {
                // Good quality, no redundancy.
                2 => vec![
                    Keyword::new("sparse retrieval", 0.1),
                    Keyword::new("dense embedding", 0.2),
                ],
                // Good quality, fully redundant.
                3 => vec![
                    Keyword::new("vector search", 0.1),
                    Keyword::new("vector search", 0.1),
                ],
                // Nothing extracted.
                4 => Vec::new(),
                // Average score outside the unit interval.
                _ => vec![Keyword::new("outlier", 7.5), Keyword::new("terms", 2.5)],
            };

            Ok(keywords)
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn optimizer() -> NgramOptimizer {
        NgramOptimizer::new(Arc::new(FixedExtractor))
    }

    #[test]
    fn test_output_matches_input_order_and_length() {
        let sizes = [4, 2, 3];
        let goodness = optimizer().optimize("text", &sizes).unwrap();

        assert_eq!(goodness.len(), sizes.len());
        assert_eq!(goodness[0], 0.0);
        assert!((goodness[1] - 0.85).abs() < 1e-9);
        assert_eq!(goodness[2], 0.0);
    }

    #[test]
    fn test_empty_extraction_scores_zero() {
        let goodness = optimizer().optimize("text", &[4]).unwrap();
        assert_eq!(goodness, vec![0.0]);
    }

    #[test]
    fn test_out_of_range_average_treated_as_worst_case() {
        // Average raw score is 5.0; quality collapses to 0.0.
        let goodness = optimizer().optimize("text", &[5]).unwrap();
        assert_eq!(goodness, vec![0.0]);
    }

    #[test]
    fn test_redundant_set_scores_zero() {
        let goodness = optimizer().optimize("text", &[3]).unwrap();
        assert_eq!(goodness, vec![0.0]);
    }

    #[test]
    fn test_weights_scale_components() {
        let config = OptimizerConfig::default().with_weights(GoodnessWeights {
            yake_weight: 0.5,
            overlap_weight: 1.0,
        });
        let optimizer = NgramOptimizer::with_config(Arc::new(FixedExtractor), config);

        let goodness = optimizer.optimize("text", &[2]).unwrap();
        assert!((goodness[0] - 0.5 * 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_best_ngram_size() {
        let best = optimizer().best_ngram_size("text", &[2, 3, 4]).unwrap();
        assert_eq!(best, Some(2));

        let best = optimizer().best_ngram_size("text", &[]).unwrap();
        assert_eq!(best, None);
    }

    #[test]
    fn test_ties_prefer_smaller_size() {
        // Sizes 3 and 4 both score 0.0.
        let best = optimizer().best_ngram_size("text", &[3, 4]).unwrap();
        assert_eq!(best, Some(3));
    }
}
