//! The sparse retrieval protocol: save, load, and query BM25 shards.
//!
//! The retriever manages one BM25 shard per logical corpus id. Shards are
//! loaded in parallel with per-shard isolated failure (a damaged shard
//! never aborts its siblings), and queried in parallel with one aggregate
//! relevance score per shard: the arithmetic mean of the shard's top-k
//! per-document BM25 scores.
//!
//! Loaded shards live in an id-to-shard map, so a partial load can never
//! mispair an id with another shard's index.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::PipelineAnalyzer;
use crate::analysis::token_filter::StopWordPolicy;
use crate::error::{Result, SagittaError};
use crate::sparse::bm25::{Bm25Index, Bm25Params};
use crate::sparse::shard::{
    PersistedShard, ShardLoadOutcome, ShardLoadReport, ShardMetadata, ShardStore,
};

/// Configuration for a [`SparseRetriever`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparseRetrieverConfig {
    /// Unique prefix of every shard name in the file system.
    pub corpora_tag: String,

    /// Directory where shards are persisted.
    pub corpus_dir: PathBuf,

    /// Stop word selection for corpus and query analysis.
    pub stop_words: StopWordPolicy,

    /// BM25 scoring parameters for newly built shards.
    pub bm25: Bm25Params,

    /// Thread pool size for parallel shard work.
    /// If `None`, uses the number of CPU cores.
    pub thread_pool_size: Option<usize>,

    /// Maximum time to wait for a shard load before reporting it missing.
    pub shard_io_timeout: Duration,
}

impl SparseRetrieverConfig {
    /// Create a configuration with defaults for everything but the tag and
    /// corpus directory.
    pub fn new<S: Into<String>, P: Into<PathBuf>>(corpora_tag: S, corpus_dir: P) -> Self {
        Self {
            corpora_tag: corpora_tag.into(),
            corpus_dir: corpus_dir.into(),
            stop_words: StopWordPolicy::default(),
            bm25: Bm25Params::default(),
            thread_pool_size: None,
            shard_io_timeout: Duration::from_secs(30),
        }
    }

    /// Set the stop word policy.
    pub fn with_stop_words(mut self, stop_words: StopWordPolicy) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Set the BM25 parameters.
    pub fn with_bm25(mut self, bm25: Bm25Params) -> Self {
        self.bm25 = bm25;
        self
    }

    /// Set the thread pool size.
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    /// Set the shard I/O timeout.
    pub fn with_shard_io_timeout(mut self, timeout: Duration) -> Self {
        self.shard_io_timeout = timeout;
        self
    }
}

/// Options for a single retrieve call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveOptions {
    /// Aggregate score threshold; entries scoring at or below it are
    /// dropped. `0.0` disables the filter.
    pub threshold: f32,

    /// Keep only this many of the highest-scoring entries. `0` disables
    /// the cap. Selection among equal scores at the cut boundary is
    /// unspecified; the returned entries themselves are deterministically
    /// ordered.
    pub top_results_limit: usize,

    /// How many per-document scores each shard aggregates over.
    pub top_k: usize,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            top_results_limit: 0,
            top_k: 10,
        }
    }
}

impl RetrieveOptions {
    /// Set the aggregate score threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the result cap.
    pub fn with_top_results_limit(mut self, limit: usize) -> Self {
        self.top_results_limit = limit;
        self
    }

    /// Set the per-shard top-k.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Validate the options, naming the offending parameter.
    pub fn validate(&self) -> Result<()> {
        if self.top_k < 1 {
            return Err(SagittaError::invalid_argument("top_k must be at least 1"));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(SagittaError::invalid_argument(
                "threshold must be a non-negative finite number",
            ));
        }

        Ok(())
    }
}

/// A retrieval query: free text, or a keyword list joined with spaces
/// before analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SparseQuery {
    /// A single query string.
    Text(String),

    /// A list of keywords.
    Keywords(Vec<String>),
}

impl SparseQuery {
    /// The query rendered as a single text to analyze.
    pub fn to_text(&self) -> String {
        match self {
            SparseQuery::Text(text) => text.clone(),
            SparseQuery::Keywords(keywords) => keywords.join(" "),
        }
    }
}

impl From<&str> for SparseQuery {
    fn from(text: &str) -> Self {
        SparseQuery::Text(text.to_string())
    }
}

impl From<String> for SparseQuery {
    fn from(text: String) -> Self {
        SparseQuery::Text(text)
    }
}

impl From<Vec<String>> for SparseQuery {
    fn from(keywords: Vec<String>) -> Self {
        SparseQuery::Keywords(keywords)
    }
}

/// Aligned (id, score) result arrays from a retrieve call.
///
/// The two arrays are always the same length and stay aligned through
/// every filter step. Entries are ordered by descending score with ties
/// broken by ascending id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseResults {
    /// Shard ids.
    pub ids: Vec<u64>,

    /// Aggregate relevance score per shard, aligned with `ids`.
    pub scores: Vec<f32>,
}

impl SparseResults {
    /// Number of result entries.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if there are no results.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over aligned (id, score) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u64, f32)> + '_ {
        self.ids.iter().copied().zip(self.scores.iter().copied())
    }
}

struct LoadedShard {
    index: Bm25Index,
    documents: Option<Vec<String>>,
    metadata: ShardMetadata,
}

/// Sparse retriever over persistent BM25 shards.
///
/// # Examples
///
/// ```no_run
/// use sagitta::sparse::retriever::{
///     RetrieveOptions, SparseQuery, SparseRetriever, SparseRetrieverConfig,
/// };
///
/// # fn main() -> sagitta::error::Result<()> {
/// let retriever =
///     SparseRetriever::new(SparseRetrieverConfig::new("wiki", "/var/corpora"))?;
///
/// let corpora = vec![vec!["a document about search engines".to_string()]];
/// retriever.save_corpus(&[1], &corpora)?;
/// retriever.load_corpus(&[1], true, true)?;
///
/// let results = retriever.retrieve(
///     &SparseQuery::from("search engines"),
///     &[1],
///     &RetrieveOptions::default(),
/// )?;
/// assert_eq!(results.ids.len(), results.scores.len());
/// # Ok(())
/// # }
/// ```
pub struct SparseRetriever {
    config: SparseRetrieverConfig,
    analyzer: PipelineAnalyzer,
    store: ShardStore,
    shards: RwLock<HashMap<u64, Arc<LoadedShard>>>,
    thread_pool: ThreadPool,
}

impl SparseRetriever {
    /// Create a new sparse retriever.
    pub fn new(config: SparseRetrieverConfig) -> Result<Self> {
        let analyzer = PipelineAnalyzer::standard(&config.stop_words)?;
        let store = ShardStore::new(&config.corpus_dir, &config.corpora_tag)?;

        let pool_size = config.thread_pool_size.unwrap_or_else(num_cpus::get);
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(pool_size)
            .thread_name(|i| format!("sparse-shard-{i}"))
            .build()
            .map_err(|e| SagittaError::internal(format!("failed to create thread pool: {e}")))?;

        Ok(Self {
            config,
            analyzer,
            store,
            shards: RwLock::new(HashMap::new()),
            thread_pool,
        })
    }

    /// The configuration this retriever was created with.
    pub fn config(&self) -> &SparseRetrieverConfig {
        &self.config
    }

    /// Build and persist one BM25 shard per (id, corpus) pair, using the
    /// configured stop word policy.
    ///
    /// Each corpus is a list of document texts. `ids` and `corpora` must
    /// have the same length.
    pub fn save_corpus(&self, ids: &[u64], corpora: &[Vec<String>]) -> Result<()> {
        self.save_corpus_inner(ids, corpora, &self.analyzer)
    }

    /// Like [`save_corpus`](Self::save_corpus), but with a stop word
    /// policy override for this call only.
    pub fn save_corpus_with_stop_words(
        &self,
        ids: &[u64],
        corpora: &[Vec<String>],
        stop_words: &StopWordPolicy,
    ) -> Result<()> {
        let analyzer = PipelineAnalyzer::standard(stop_words)?;
        self.save_corpus_inner(ids, corpora, &analyzer)
    }

    fn save_corpus_inner(
        &self,
        ids: &[u64],
        corpora: &[Vec<String>],
        analyzer: &PipelineAnalyzer,
    ) -> Result<()> {
        if ids.len() != corpora.len() {
            return Err(SagittaError::invalid_argument(format!(
                "corpora must have the same length as ids ({} != {})",
                corpora.len(),
                ids.len()
            )));
        }

        for (id, corpus) in ids.iter().zip(corpora.iter()) {
            let tokenized: Vec<Vec<String>> = corpus
                .iter()
                .map(|document| analyzer.terms(document))
                .collect::<Result<_>>()?;

            let shard = PersistedShard {
                metadata: ShardMetadata {
                    doc_count: corpus.len() as u64,
                    created_at: chrono::Utc::now(),
                },
                index: Bm25Index::build(&tokenized, self.config.bm25),
                documents: Some(corpus.clone()),
            };

            self.store.save(*id, &shard)?;
        }

        log::debug!("saved {} shard(s) under tag '{}'", ids.len(), self.store.tag());

        Ok(())
    }

    /// Load the shards for the given ids in parallel.
    ///
    /// A shard that fails to load is reported as
    /// [`ShardLoadOutcome::Missing`] and excluded from retrieval; the
    /// remaining shards load normally. The returned reports are in
    /// requested-id order, one per requested id.
    pub fn load_corpus(
        &self,
        ids: &[u64],
        use_memory_map: bool,
        load_documents: bool,
    ) -> Result<Vec<ShardLoadReport>> {
        let num_shards = ids.len();
        let (tx, rx) = mpsc::channel::<(usize, Result<PersistedShard>)>();

        for (slot, &id) in ids.iter().enumerate() {
            let tx = tx.clone();
            let store = self.store.clone();

            self.thread_pool.spawn(move || {
                let outcome = store.load(id, use_memory_map, load_documents);
                // The receiver may have given up on a timeout.
                let _ = tx.send((slot, outcome));
            });
        }
        drop(tx);

        let deadline = Instant::now() + self.config.shard_io_timeout;
        let mut slots: Vec<Option<Result<PersistedShard>>> = Vec::new();
        slots.resize_with(num_shards, || None);

        for _ in 0..num_shards {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((slot, outcome)) => slots[slot] = Some(outcome),
                Err(_) => break,
            }
        }

        let mut reports = Vec::with_capacity(num_shards);
        let mut loaded: Vec<(u64, LoadedShard)> = Vec::new();

        for (&id, slot) in ids.iter().zip(slots.into_iter()) {
            let report = match slot {
                Some(Ok(shard)) => {
                    let metadata = shard.metadata.clone();
                    loaded.push((
                        id,
                        LoadedShard {
                            index: shard.index,
                            documents: shard.documents,
                            metadata: shard.metadata,
                        },
                    ));
                    ShardLoadReport {
                        id,
                        outcome: ShardLoadOutcome::Loaded,
                        metadata: Some(metadata),
                    }
                }
                Some(Err(e)) => {
                    let reason = e.to_string();
                    log::warn!("shard {} not loaded: {reason}", self.store.shard_name(id));
                    ShardLoadReport {
                        id,
                        outcome: ShardLoadOutcome::Missing(reason),
                        metadata: None,
                    }
                }
                None => {
                    let reason = format!(
                        "shard load timed out after {:?}",
                        self.config.shard_io_timeout
                    );
                    log::warn!("shard {} not loaded: {reason}", self.store.shard_name(id));
                    ShardLoadReport {
                        id,
                        outcome: ShardLoadOutcome::Missing(reason),
                        metadata: None,
                    }
                }
            };

            reports.push(report);
        }

        if !loaded.is_empty() {
            let mut shards = self.shards.write();
            for (id, shard) in loaded {
                shards.insert(id, Arc::new(shard));
            }
        }

        Ok(reports)
    }

    /// Retrieve aggregate relevance scores for the requested shard ids.
    ///
    /// Ids without a loaded shard are skipped silently, so the result
    /// length is at most the number of successfully loaded shards. Each
    /// loaded shard's score is the arithmetic mean of its top
    /// [`top_k`](RetrieveOptions::top_k) per-document BM25 scores for the
    /// analyzed query; shards are scored in parallel.
    pub fn retrieve(
        &self,
        query: &SparseQuery,
        ids: &[u64],
        options: &RetrieveOptions,
    ) -> Result<SparseResults> {
        options.validate()?;

        let query_terms = self.analyzer.terms(&query.to_text())?;

        let requested: Vec<(u64, Arc<LoadedShard>)> = {
            let shards = self.shards.read();
            ids.iter()
                .filter_map(|id| shards.get(id).map(|shard| (*id, Arc::clone(shard))))
                .collect()
        };

        let top_k = options.top_k;
        let mut scored: Vec<(u64, f32)> = self.thread_pool.install(|| {
            requested
                .par_iter()
                .map(|(id, shard)| {
                    let hits = shard.index.retrieve(&query_terms, top_k);
                    let score = if hits.is_empty() {
                        0.0
                    } else {
                        hits.iter().map(|(_, score)| score).sum::<f32>() / hits.len() as f32
                    };
                    (*id, score)
                })
                .collect()
        });

        if options.threshold > 0.0 {
            scored.retain(|(_, score)| *score > options.threshold);
        }

        let limit = options.top_results_limit;
        if limit > 0 && limit < scored.len() {
            // O(n) partial selection of the `limit` highest scores.
            scored.select_nth_unstable_by(limit - 1, |a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            });
            scored.truncate(limit);
        }

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let (ids, scores) = scored.into_iter().unzip();
        Ok(SparseResults { ids, scores })
    }

    /// Ids of all currently loaded shards, in ascending order.
    pub fn shard_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.shards.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of currently loaded shards.
    pub fn shard_count(&self) -> usize {
        self.shards.read().len()
    }

    /// Check whether a shard is loaded.
    pub fn contains_shard(&self, id: u64) -> bool {
        self.shards.read().contains_key(&id)
    }

    /// Documents of a loaded shard, when they were loaded with it.
    pub fn documents(&self, id: u64) -> Option<Vec<String>> {
        self.shards
            .read()
            .get(&id)
            .and_then(|shard| shard.documents.clone())
    }

    /// Metadata of a loaded shard.
    pub fn shard_metadata(&self, id: u64) -> Option<ShardMetadata> {
        self.shards.read().get(&id).map(|shard| shard.metadata.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieve_options_validation() {
        let options = RetrieveOptions::default().with_top_k(0);
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("top_k"));

        let options = RetrieveOptions::default().with_threshold(f32::NAN);
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("threshold"));

        assert!(RetrieveOptions::default().validate().is_ok());
    }

    #[test]
    fn test_sparse_query_to_text() {
        let query = SparseQuery::from(vec!["hybrid".to_string(), "search".to_string()]);
        assert_eq!(query.to_text(), "hybrid search");

        let query = SparseQuery::from("hybrid search");
        assert_eq!(query.to_text(), "hybrid search");
    }

    #[test]
    fn test_save_corpus_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let retriever =
            SparseRetriever::new(SparseRetrieverConfig::new("test", dir.path())).unwrap();

        let err = retriever
            .save_corpus(&[1, 2], &[vec!["only one corpus".to_string()]])
            .unwrap_err();
        assert!(err.to_string().contains("corpora"));
    }

    #[test]
    fn test_retrieve_with_no_loaded_shards() {
        let dir = tempfile::tempdir().unwrap();
        let retriever =
            SparseRetriever::new(SparseRetrieverConfig::new("test", dir.path())).unwrap();

        let results = retriever
            .retrieve(
                &SparseQuery::from("anything"),
                &[1, 2, 3],
                &RetrieveOptions::default(),
            )
            .unwrap();
        assert!(results.is_empty());
    }
}
