//! Dense retrieval over pluggable embedders and vector collections.
//!
//! The dense side of hybrid retrieval is glue around two external
//! collaborators: a [`TextEmbedder`] that turns text into fixed-size
//! vectors, and a [`VectorCollection`] that stores vectors with documents
//! and metadata and answers nearest-neighbor queries with a keyword
//! metadata filter. [`DenseRetriever`] owns both; the embedder is
//! constructed fallibly by the caller and injected, so an embedding
//! backend that fails to initialize aborts construction instead of
//! degrading silently.

pub mod collection;
pub mod embedder;
pub mod retriever;

pub use collection::{KeywordFilter, MemoryVectorCollection, VectorCollection, VectorMatch};
pub use embedder::{PrecomputedEmbedder, TextEmbedder};
pub use retriever::DenseRetriever;
