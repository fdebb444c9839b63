//! Text embedding trait for the dense retrieval pipeline.

use std::collections::HashMap;

use crate::error::{Result, SagittaError};

/// Trait for converting text to vector embeddings.
///
/// Implementations wrap an embedding backend (a local neural model, an API
/// service, a lookup table). Constructors are fallible: a backend that
/// cannot initialize returns an error instead of a half-constructed
/// embedder.
pub trait TextEmbedder: Send + Sync {
    /// Embed a batch of texts into fixed-length vectors, one per input, in
    /// input order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Dimension of the vectors this embedder produces.
    fn dimension(&self) -> usize;

    /// Get the name of this embedder (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// An embedder backed by a table of pre-computed vectors.
///
/// Useful for tests and for pipelines where embeddings were computed
/// offline. Texts absent from the table are an error rather than a silent
/// zero vector.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use sagitta::dense::embedder::{PrecomputedEmbedder, TextEmbedder};
///
/// let mut vectors = HashMap::new();
/// vectors.insert("hello".to_string(), vec![1.0, 0.0]);
/// let embedder = PrecomputedEmbedder::new(vectors).unwrap();
///
/// assert_eq!(embedder.dimension(), 2);
/// assert_eq!(embedder.embed(&["hello".to_string()]).unwrap()[0], vec![1.0, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct PrecomputedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    dimension: usize,
}

impl PrecomputedEmbedder {
    /// Create an embedder from a text-to-vector table.
    ///
    /// The table must be non-empty and every vector must have the same
    /// dimension.
    pub fn new(vectors: HashMap<String, Vec<f32>>) -> Result<Self> {
        let Some(dimension) = vectors.values().next().map(Vec::len) else {
            return Err(SagittaError::embedding(
                "precomputed vector table must not be empty",
            ));
        };

        if dimension == 0 {
            return Err(SagittaError::embedding(
                "precomputed vectors must not be zero-dimensional",
            ));
        }

        for (text, vector) in &vectors {
            if vector.len() != dimension {
                return Err(SagittaError::embedding(format!(
                    "inconsistent vector dimension for '{text}': expected {dimension}, got {}",
                    vector.len()
                )));
            }
        }

        Ok(Self { vectors, dimension })
    }
}

impl TextEmbedder for PrecomputedEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|text| {
                self.vectors.get(text).cloned().ok_or_else(|| {
                    SagittaError::embedding(format!("no precomputed vector for '{text}'"))
                })
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &'static str {
        "precomputed"
    }
}
