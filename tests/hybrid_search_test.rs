use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use sagitta::dense::collection::MemoryVectorCollection;
use sagitta::dense::embedder::PrecomputedEmbedder;
use sagitta::dense::retriever::DenseRetriever;
use sagitta::fusion::{FusionStrategy, fuse};
use sagitta::keyword::extractor::{ExtractorConfig, KeywordExtractor, YakeExtractor};
use sagitta::keyword::optimizer::NgramOptimizer;
use sagitta::sparse::retriever::{
    RetrieveOptions, SparseQuery, SparseRetriever, SparseRetrieverConfig,
};

const QUERY: &str = "rust memory safety";

fn keyword_metadata(keywords: &[&str]) -> HashMap<String, serde_json::Value> {
    let mut metadata = HashMap::new();
    metadata.insert("keywords".to_string(), json!(keywords));
    metadata
}

fn dense_retriever() -> DenseRetriever {
    let mut vectors = HashMap::new();
    vectors.insert("a guide to rust and memory safety".to_string(), vec![1.0, 0.0]);
    vectors.insert("an introduction to orchestral music".to_string(), vec![0.0, 1.0]);
    vectors.insert(QUERY.to_string(), vec![0.95, 0.05]);

    let embedder = Arc::new(PrecomputedEmbedder::new(vectors).unwrap());
    let retriever =
        DenseRetriever::new(embedder, Box::new(MemoryVectorCollection::new(2))).unwrap();

    retriever
        .add(
            &["1".to_string(), "2".to_string()],
            &[
                "a guide to rust and memory safety".to_string(),
                "an introduction to orchestral music".to_string(),
            ],
            &[
                keyword_metadata(&["rust", "memory"]),
                keyword_metadata(&["music"]),
            ],
        )
        .unwrap();

    retriever
}

#[test]
fn test_sparse_and_dense_results_fuse_into_one_ranking() {
    let dir = tempfile::tempdir().unwrap();
    let sparse_retriever =
        SparseRetriever::new(SparseRetrieverConfig::new("hybrid", dir.path())).unwrap();

    let corpora = vec![
        vec![
            "rust systems programming".to_string(),
            "memory safety guarantees".to_string(),
        ],
        vec!["orchestral music composition".to_string()],
    ];
    sparse_retriever.save_corpus(&[1, 2], &corpora).unwrap();
    sparse_retriever.load_corpus(&[1, 2], false, false).unwrap();

    let sparse_results = sparse_retriever
        .retrieve(
            &SparseQuery::from(QUERY),
            &[1, 2],
            &RetrieveOptions::default(),
        )
        .unwrap();

    let dense_matches = dense_retriever().query(&[], QUERY, 10).unwrap();

    // Fuse on a shared id space: dense ids parse back to shard ids here.
    let sparse_list: Vec<(u64, f32)> = sparse_results.iter().collect();
    let dense_list: Vec<(u64, f32)> = dense_matches
        .iter()
        .map(|m| (m.id.parse::<u64>().unwrap(), m.similarity))
        .collect();

    let fused = fuse(&FusionStrategy::default(), &sparse_list, &dense_list, 0);

    assert_eq!(fused.len(), 2);
    assert_eq!(fused[0].id, 1);
    assert!(fused[0].sparse_score.is_some());
    assert!(fused[0].dense_score.is_some());
    assert!(fused[0].score > fused[1].score);
}

#[test]
fn test_keyword_pipeline_selects_a_granularity() {
    let text = "Hybrid information retrieval combines dense vector similarity \
                search with sparse lexical search over a document corpus. \
                Keyword extraction selects representative terms from the query, \
                and the retrievers score each document group independently \
                before the result lists are fused into a single ranking.";

    let extractor = Arc::new(YakeExtractor::new());
    let keywords = extractor.extract(text, &ExtractorConfig::default()).unwrap();
    assert!(!keywords.is_empty());

    let optimizer = NgramOptimizer::new(extractor);
    let goodness = optimizer.optimize(text, &[2, 3, 4]).unwrap();

    assert_eq!(goodness.len(), 3);
    for score in &goodness {
        assert!((0.0..=1.0).contains(score));
    }

    let best = optimizer.best_ngram_size(text, &[2, 3, 4]).unwrap();
    assert!(matches!(best, Some(2..=4)));
}
