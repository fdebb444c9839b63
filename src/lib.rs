//! # Sagitta
//!
//! A hybrid retrieval library combining sparse lexical (BM25) search with
//! dense vector search.
//!
//! ## Features
//!
//! - Multi-granularity keyword extraction with goodness scoring for picking
//!   the best n-gram size for query expansion
//! - Sharded, persistent BM25 sparse retrieval with parallel shard loading
//!   and querying
//! - Dense retrieval over pluggable embedders and vector collections
//! - Configurable fusion of sparse and dense result lists

pub mod analysis;
pub mod corpus;
pub mod dense;
pub mod error;
pub mod fusion;
pub mod keyword;
pub mod sparse;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
