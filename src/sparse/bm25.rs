//! BM25 index over one shard's analyzed documents.
//!
//! Each shard holds a compact inverted index (term -> per-document term
//! frequencies) plus the document length statistics BM25 needs. Retrieval
//! scores every document against the query terms and returns the top-k by
//! partial selection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// BM25 scoring parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bm25Params {
    /// K1 parameter (term frequency saturation).
    pub k1: f32,

    /// B parameter (document length normalization).
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.2, b: 0.75 }
    }
}

/// An immutable BM25 index over the documents of a single shard.
///
/// # Examples
///
/// ```
/// use sagitta::sparse::bm25::{Bm25Index, Bm25Params};
///
/// let docs = vec![
///     vec!["rust".to_string(), "search".to_string()],
///     vec!["python".to_string(), "scripting".to_string()],
/// ];
/// let index = Bm25Index::build(&docs, Bm25Params::default());
///
/// let hits = index.retrieve(&["rust".to_string()], 2);
/// assert_eq!(hits[0].0, 0);
/// assert!(hits[0].1 > hits[1].1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bm25Index {
    params: Bm25Params,

    /// Term -> (doc ordinal, term frequency) postings.
    postings: HashMap<String, Vec<(u32, u32)>>,

    /// Length in tokens of each document.
    doc_lengths: Vec<u32>,

    /// Average document length, precomputed at build time.
    avg_doc_length: f32,
}

impl Bm25Index {
    /// Build an index from pre-analyzed documents (one token list per
    /// document).
    pub fn build(documents: &[Vec<String>], params: Bm25Params) -> Self {
        let mut postings: HashMap<String, Vec<(u32, u32)>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(documents.len());

        for (doc_ordinal, tokens) in documents.iter().enumerate() {
            doc_lengths.push(tokens.len() as u32);

            let mut term_frequencies: ahash::AHashMap<&str, u32> = ahash::AHashMap::new();
            for token in tokens {
                *term_frequencies.entry(token.as_str()).or_insert(0) += 1;
            }

            for (term, tf) in term_frequencies {
                postings
                    .entry(term.to_string())
                    .or_default()
                    .push((doc_ordinal as u32, tf));
            }
        }

        let total_tokens: u64 = doc_lengths.iter().map(|&len| len as u64).sum();
        let avg_doc_length = if doc_lengths.is_empty() {
            0.0
        } else {
            total_tokens as f32 / doc_lengths.len() as f32
        };

        Bm25Index {
            params,
            postings,
            doc_lengths,
            avg_doc_length,
        }
    }

    /// Number of documents in this index.
    pub fn doc_count(&self) -> usize {
        self.doc_lengths.len()
    }

    /// Number of distinct terms in this index.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Score all documents against the query terms and return the top `k`
    /// (document ordinal, score) pairs, sorted by descending score with
    /// ties broken by ascending ordinal.
    ///
    /// All documents participate, so zero-scored documents can appear when
    /// fewer than `k` documents match any query term. The result length is
    /// `min(k, doc_count)`.
    pub fn retrieve(&self, query_terms: &[String], k: usize) -> Vec<(u32, f32)> {
        let doc_count = self.doc_lengths.len();
        if doc_count == 0 || k == 0 {
            return Vec::new();
        }

        let mut scores = vec![0.0f32; doc_count];
        let n = doc_count as f32;

        for term in query_terms {
            let Some(posting_list) = self.postings.get(term) else {
                continue;
            };

            let df = posting_list.len() as f32;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for &(doc_ordinal, tf) in posting_list {
                let tf = tf as f32;
                let doc_length = self.doc_lengths[doc_ordinal as usize] as f32;
                let length_norm = if self.avg_doc_length > 0.0 {
                    1.0 - self.params.b + self.params.b * (doc_length / self.avg_doc_length)
                } else {
                    1.0
                };

                let numerator = tf * (self.params.k1 + 1.0);
                let denominator = tf + self.params.k1 * length_norm;
                scores[doc_ordinal as usize] += idf * (numerator / denominator);
            }
        }

        let mut hits: Vec<(u32, f32)> = scores
            .into_iter()
            .enumerate()
            .map(|(ordinal, score)| (ordinal as u32, score))
            .collect();

        let k = k.min(hits.len());
        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, |a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            });
            hits.truncate(k);
        }

        hits.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<Vec<String>> {
        texts
            .iter()
            .map(|t| t.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_default_params() {
        let params = Bm25Params::default();
        assert_eq!(params.k1, 1.2);
        assert_eq!(params.b, 0.75);
    }

    #[test]
    fn test_matching_doc_ranks_first() {
        let index = Bm25Index::build(
            &docs(&[
                "rust systems programming",
                "python scripting language",
                "rust rust rust",
            ]),
            Bm25Params::default(),
        );

        let hits = index.retrieve(&["rust".to_string()], 3);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].0, 2);
        assert!(hits[0].1 >= hits[1].1);
        assert!(hits[1].1 >= hits[2].1);
    }

    #[test]
    fn test_result_length_capped_at_k() {
        let index = Bm25Index::build(
            &docs(&["a b", "b c", "c d", "d e"]),
            Bm25Params::default(),
        );

        assert_eq!(index.retrieve(&["b".to_string()], 2).len(), 2);
        assert_eq!(index.retrieve(&["b".to_string()], 10).len(), 4);
    }

    #[test]
    fn test_unknown_term_scores_zero() {
        let index = Bm25Index::build(&docs(&["alpha beta"]), Bm25Params::default());

        let hits = index.retrieve(&["gamma".to_string()], 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, 0.0);
    }

    #[test]
    fn test_empty_index() {
        let index = Bm25Index::build(&[], Bm25Params::default());
        assert_eq!(index.doc_count(), 0);
        assert!(index.retrieve(&["anything".to_string()], 5).is_empty());
    }

    #[test]
    fn test_tie_break_by_ordinal() {
        let index = Bm25Index::build(&docs(&["x y", "x y"]), Bm25Params::default());

        let hits = index.retrieve(&["x".to_string()], 2);
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 1);
        assert_eq!(hits[0].1, hits[1].1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let index = Bm25Index::build(&docs(&["alpha beta", "beta gamma"]), Bm25Params::default());
        let bytes = bincode::serialize(&index).unwrap();
        let restored: Bm25Index = bincode::deserialize(&bytes).unwrap();

        assert_eq!(restored.doc_count(), 2);
        assert_eq!(
            index.retrieve(&["beta".to_string()], 2),
            restored.retrieve(&["beta".to_string()], 2)
        );
    }
}
