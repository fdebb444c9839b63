//! Dense retriever combining an embedder with a vector collection.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::dense::collection::{KeywordFilter, VectorCollection, VectorMatch};
use crate::dense::embedder::TextEmbedder;
use crate::error::{Result, SagittaError};

/// Dense retriever over a vector collection.
///
/// Owns an injected [`TextEmbedder`] (constructed once by the caller) and
/// a [`VectorCollection`]; documents are embedded on add, queries are
/// embedded on retrieve and restricted by a keyword metadata filter.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use sagitta::dense::collection::MemoryVectorCollection;
/// use sagitta::dense::embedder::PrecomputedEmbedder;
/// use sagitta::dense::retriever::DenseRetriever;
///
/// let mut vectors = HashMap::new();
/// vectors.insert("some document".to_string(), vec![1.0, 0.0]);
/// let embedder = Arc::new(PrecomputedEmbedder::new(vectors).unwrap());
/// let collection = Box::new(MemoryVectorCollection::new(2));
///
/// let retriever = DenseRetriever::new(embedder, collection).unwrap();
/// ```
pub struct DenseRetriever {
    embedder: Arc<dyn TextEmbedder>,
    collection: Box<dyn VectorCollection>,
}

impl DenseRetriever {
    /// Create a dense retriever from an embedder and a collection.
    ///
    /// Fails when the embedder and collection disagree on vector
    /// dimension.
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        collection: Box<dyn VectorCollection>,
    ) -> Result<Self> {
        if embedder.dimension() != collection.dimension() {
            return Err(SagittaError::invalid_argument(format!(
                "collection: embedder produces {}-dimensional vectors but the \
                 collection stores {}-dimensional vectors",
                embedder.dimension(),
                collection.dimension()
            )));
        }

        Ok(Self {
            embedder,
            collection,
        })
    }

    /// The embedder this retriever was constructed with.
    pub fn embedder(&self) -> &Arc<dyn TextEmbedder> {
        &self.embedder
    }

    /// Embed and add documents with their metadata.
    pub fn add(
        &self,
        ids: &[String],
        documents: &[String],
        metadatas: &[HashMap<String, Value>],
    ) -> Result<()> {
        if ids.len() != documents.len() || ids.len() != metadatas.len() {
            return Err(SagittaError::invalid_argument(
                "ids, documents and metadatas must have the same length",
            ));
        }

        let embeddings = self.embedder.embed(documents)?;
        self.collection.add(ids, &embeddings, documents, metadatas)
    }

    /// Embed the query text and return the `n_results` most similar
    /// documents whose `keywords` metadata intersects `keywords`.
    ///
    /// An empty keyword list disables the filter.
    pub fn query(
        &self,
        keywords: &[String],
        query_text: &str,
        n_results: usize,
    ) -> Result<Vec<VectorMatch>> {
        if n_results == 0 {
            return Err(SagittaError::invalid_argument(
                "n_results must be at least 1",
            ));
        }

        let embeddings = self.embedder.embed(&[query_text.to_string()])?;
        let embedding = embeddings
            .first()
            .ok_or_else(|| SagittaError::embedding("embedder returned no vector for the query"))?;

        let filter = if keywords.is_empty() {
            None
        } else {
            Some(KeywordFilter::any_of(keywords))
        };

        self.collection.query(embedding, n_results, filter.as_ref())
    }

    /// Number of documents in the underlying collection.
    pub fn len(&self) -> usize {
        self.collection.len()
    }

    /// Check if the underlying collection is empty.
    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }
}
