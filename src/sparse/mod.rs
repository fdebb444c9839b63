//! Sparse lexical retrieval over persistent BM25 shards.
//!
//! A corpus is split into logical document groups, each indexed into its
//! own BM25 shard and persisted independently under a stable
//! `{corpora_tag}_{id}` name. Retrieval aggregates per-shard document
//! scores into one relevance score per shard, then filters and caps the
//! aligned (id, score) result arrays.
//!
//! - [`bm25`] — the per-shard BM25 index and scoring parameters
//! - [`shard`] — shard persistence, naming, and load reporting
//! - [`retriever`] — the save/load/retrieve protocol with parallel shard
//!   loading and querying

pub mod bm25;
pub mod retriever;
pub mod shard;

pub use bm25::{Bm25Index, Bm25Params};
pub use retriever::{
    RetrieveOptions, SparseQuery, SparseResults, SparseRetriever, SparseRetrieverConfig,
};
pub use shard::{ShardLoadOutcome, ShardLoadReport, ShardMetadata, ShardStore};
