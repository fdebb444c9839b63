//! Vector collection trait and an in-memory implementation.
//!
//! A vector collection stores embeddings alongside documents and metadata
//! and answers nearest-neighbor queries, optionally restricted by a
//! keyword metadata filter. The trait mirrors an external vector store's
//! collection surface so one can be swapped in without touching the
//! retriever.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{Result, SagittaError};

/// Metadata filter matching documents whose `keywords` metadata entry
/// (an array of strings) intersects the given set.
///
/// Keywords are lowercased on construction and compared lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFilter {
    any_of: Vec<String>,
}

impl KeywordFilter {
    /// Create a filter matching any of the given keywords.
    pub fn any_of<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            any_of: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Check whether a document's metadata passes this filter.
    pub fn matches(&self, metadata: &HashMap<String, Value>) -> bool {
        let Some(Value::Array(keywords)) = metadata.get("keywords") else {
            return false;
        };

        keywords.iter().any(|keyword| {
            keyword
                .as_str()
                .is_some_and(|k| self.any_of.iter().any(|wanted| wanted == &k.to_lowercase()))
        })
    }
}

/// A single match from a vector collection query.
#[derive(Debug, Clone)]
pub struct VectorMatch {
    /// Document id.
    pub id: String,

    /// Cosine similarity to the query embedding.
    pub similarity: f32,

    /// Document content.
    pub document: String,

    /// Document metadata.
    pub metadata: HashMap<String, Value>,
}

/// Trait for vector collections storing embeddings with documents and
/// metadata.
pub trait VectorCollection: Send + Sync {
    /// Dimension of the vectors this collection stores.
    fn dimension(&self) -> usize;

    /// Add documents with their embeddings and metadata. Existing ids are
    /// replaced. All slices must have the same length, and every embedding
    /// must match the collection dimension.
    fn add(
        &self,
        ids: &[String],
        embeddings: &[Vec<f32>],
        documents: &[String],
        metadatas: &[HashMap<String, Value>],
    ) -> Result<()>;

    /// Query the `n_results` most similar documents, optionally restricted
    /// by a keyword metadata filter.
    fn query(
        &self,
        embedding: &[f32],
        n_results: usize,
        filter: Option<&KeywordFilter>,
    ) -> Result<Vec<VectorMatch>>;

    /// Number of documents in the collection.
    fn len(&self) -> usize;

    /// Check if the collection is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Entry {
    id: String,
    embedding: Vec<f32>,
    document: String,
    metadata: HashMap<String, Value>,
}

/// Brute-force in-memory vector collection using cosine similarity.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use sagitta::dense::collection::{MemoryVectorCollection, VectorCollection};
///
/// let collection = MemoryVectorCollection::new(2);
/// collection
///     .add(
///         &["doc1".to_string()],
///         &[vec![1.0, 0.0]],
///         &["a document".to_string()],
///         &[HashMap::new()],
///     )
///     .unwrap();
///
/// let matches = collection.query(&[1.0, 0.0], 1, None).unwrap();
/// assert_eq!(matches[0].id, "doc1");
/// ```
pub struct MemoryVectorCollection {
    dimension: usize,
    entries: RwLock<Vec<Entry>>,
}

impl MemoryVectorCollection {
    /// Create an empty collection for vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: RwLock::new(Vec::new()),
        }
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }
}

impl VectorCollection for MemoryVectorCollection {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn add(
        &self,
        ids: &[String],
        embeddings: &[Vec<f32>],
        documents: &[String],
        metadatas: &[HashMap<String, Value>],
    ) -> Result<()> {
        if ids.len() != embeddings.len()
            || ids.len() != documents.len()
            || ids.len() != metadatas.len()
        {
            return Err(SagittaError::invalid_argument(
                "ids, embeddings, documents and metadatas must have the same length",
            ));
        }

        for (id, embedding) in ids.iter().zip(embeddings.iter()) {
            if embedding.len() != self.dimension {
                return Err(SagittaError::invalid_argument(format!(
                    "embeddings: vector for '{id}' has dimension {}, expected {}",
                    embedding.len(),
                    self.dimension
                )));
            }
        }

        let mut entries = self.entries.write();
        for (((id, embedding), document), metadata) in ids
            .iter()
            .zip(embeddings.iter())
            .zip(documents.iter())
            .zip(metadatas.iter())
        {
            entries.retain(|entry| &entry.id != id);
            entries.push(Entry {
                id: id.clone(),
                embedding: embedding.clone(),
                document: document.clone(),
                metadata: metadata.clone(),
            });
        }

        Ok(())
    }

    fn query(
        &self,
        embedding: &[f32],
        n_results: usize,
        filter: Option<&KeywordFilter>,
    ) -> Result<Vec<VectorMatch>> {
        if embedding.len() != self.dimension {
            return Err(SagittaError::invalid_argument(format!(
                "embedding: query vector has dimension {}, expected {}",
                embedding.len(),
                self.dimension
            )));
        }

        let entries = self.entries.read();
        let mut matches: Vec<VectorMatch> = entries
            .iter()
            .filter(|entry| filter.is_none_or(|f| f.matches(&entry.metadata)))
            .map(|entry| VectorMatch {
                id: entry.id.clone(),
                similarity: Self::cosine_similarity(embedding, &entry.embedding),
                document: entry.document.clone(),
                metadata: entry.metadata.clone(),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        matches.truncate(n_results);

        Ok(matches)
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keyword_metadata(keywords: &[&str]) -> HashMap<String, Value> {
        let mut metadata = HashMap::new();
        metadata.insert("keywords".to_string(), json!(keywords));
        metadata
    }

    fn populated() -> MemoryVectorCollection {
        let collection = MemoryVectorCollection::new(3);
        collection
            .add(
                &["d1".to_string(), "d2".to_string(), "d3".to_string()],
                &[
                    vec![1.0, 0.0, 0.0],
                    vec![0.0, 1.0, 0.0],
                    vec![0.0, 0.0, 1.0],
                ],
                &[
                    "first doc".to_string(),
                    "second doc".to_string(),
                    "third doc".to_string(),
                ],
                &[
                    keyword_metadata(&["rust", "search"]),
                    keyword_metadata(&["python"]),
                    keyword_metadata(&["rust"]),
                ],
            )
            .unwrap();
        collection
    }

    #[test]
    fn test_query_ranks_by_similarity() {
        let collection = populated();
        let matches = collection.query(&[1.0, 0.1, 0.0], 3, None).unwrap();

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].id, "d1");
        assert!(matches[0].similarity > matches[1].similarity);
    }

    #[test]
    fn test_keyword_filter_restricts_results() {
        let collection = populated();
        let filter = KeywordFilter::any_of(["rust"]);
        let matches = collection.query(&[1.0, 1.0, 1.0], 10, Some(&filter)).unwrap();

        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"d1"));
        assert!(ids.contains(&"d3"));
    }

    #[test]
    fn test_keyword_filter_is_case_insensitive() {
        let filter = KeywordFilter::any_of(["RUST"]);
        assert!(filter.matches(&keyword_metadata(&["Rust"])));
        assert!(!filter.matches(&keyword_metadata(&["go"])));
        assert!(!filter.matches(&HashMap::new()));
    }

    #[test]
    fn test_add_length_mismatch() {
        let collection = MemoryVectorCollection::new(3);
        let err = collection
            .add(&["d1".to_string()], &[], &[], &[])
            .unwrap_err();
        assert!(err.to_string().contains("same length"));
    }

    #[test]
    fn test_add_dimension_mismatch() {
        let collection = MemoryVectorCollection::new(3);
        let err = collection
            .add(
                &["d1".to_string()],
                &[vec![1.0]],
                &["doc".to_string()],
                &[HashMap::new()],
            )
            .unwrap_err();
        assert!(err.to_string().contains("dimension"));
    }

    #[test]
    fn test_add_replaces_existing_id() {
        let collection = populated();
        collection
            .add(
                &["d1".to_string()],
                &[vec![0.0, 1.0, 0.0]],
                &["replacement".to_string()],
                &[HashMap::new()],
            )
            .unwrap();

        assert_eq!(collection.len(), 3);
        let matches = collection.query(&[0.0, 1.0, 0.0], 1, None).unwrap();
        assert_eq!(matches[0].document, "replacement");
    }
}
