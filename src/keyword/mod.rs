//! Keyword extraction and n-gram goodness scoring.
//!
//! This module selects representative keywords for a text and picks the
//! n-gram granularity that yields the best keyword set:
//!
//! - [`extractor`] wraps an external statistical keyword extractor behind
//!   the [`KeywordExtractor`] trait, with a YAKE-backed default binding
//! - [`overlap`] scores redundancy among an extracted keyword set
//! - [`optimizer`] runs extraction at multiple n-gram granularities and
//!   combines per-granularity quality and redundancy into a goodness score

pub mod extractor;
pub mod optimizer;
pub mod overlap;

pub use extractor::{DedupAlgorithm, ExtractorConfig, Keyword, KeywordExtractor, YakeExtractor};
pub use optimizer::{GoodnessWeights, NgramOptimizer, OptimizerConfig};
pub use overlap::{DEFAULT_JACCARD_THRESHOLD, overlap_score};
