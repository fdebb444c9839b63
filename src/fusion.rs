//! Fusion of sparse and dense result lists.
//!
//! Dense and sparse retrieval produce independently ranked (id, score)
//! lists whose score scales are not comparable (BM25 shard means vs.
//! cosine similarities). This module combines the two lists into one
//! ranking under an explicit, configurable strategy.

use std::hash::Hash;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Strategy for combining a sparse and a dense result list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FusionStrategy {
    /// Reciprocal rank fusion: each list contributes `1 / (k + rank)` per
    /// entry, with 1-based ranks. Robust to incomparable score scales.
    ReciprocalRank {
        /// Rank smoothing constant.
        k: f32,
    },

    /// Min-max normalize each list to `[0, 1]`, then combine as a
    /// weighted sum. Entries absent from a list contribute `0.0` for it.
    WeightedScore {
        /// Weight for sparse scores.
        sparse_weight: f32,
        /// Weight for dense scores.
        dense_weight: f32,
    },
}

impl Default for FusionStrategy {
    fn default() -> Self {
        FusionStrategy::ReciprocalRank { k: 60.0 }
    }
}

/// A single fused result with its per-source scores retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedHit<K> {
    /// Document or shard id.
    pub id: K,

    /// Combined fusion score.
    pub score: f32,

    /// Sparse score, when the id appeared in the sparse list.
    pub sparse_score: Option<f32>,

    /// Dense score, when the id appeared in the dense list.
    pub dense_score: Option<f32>,
}

/// Fuse a sparse and a dense result list into one ranking.
///
/// Both inputs must be ranked by descending score. The fused output is
/// sorted by descending fusion score with ties broken by ascending id,
/// and truncated to `max_results` when it is non-zero.
///
/// # Examples
///
/// ```
/// use sagitta::fusion::{FusionStrategy, fuse};
///
/// let sparse = vec![(1u64, 12.0), (2, 3.0)];
/// let dense = vec![(2u64, 0.9), (3, 0.4)];
///
/// let fused = fuse(&FusionStrategy::default(), &sparse, &dense, 0);
/// assert_eq!(fused[0].id, 2);
/// assert_eq!(fused.len(), 3);
/// ```
pub fn fuse<K>(
    strategy: &FusionStrategy,
    sparse: &[(K, f32)],
    dense: &[(K, f32)],
    max_results: usize,
) -> Vec<FusedHit<K>>
where
    K: Clone + Eq + Hash + Ord,
{
    let mut hits: AHashMap<K, FusedHit<K>> = AHashMap::new();

    for (id, score) in sparse {
        hits.insert(
            id.clone(),
            FusedHit {
                id: id.clone(),
                score: 0.0,
                sparse_score: Some(*score),
                dense_score: None,
            },
        );
    }

    for (id, score) in dense {
        hits.entry(id.clone())
            .or_insert_with(|| FusedHit {
                id: id.clone(),
                score: 0.0,
                sparse_score: None,
                dense_score: None,
            })
            .dense_score = Some(*score);
    }

    match *strategy {
        FusionStrategy::ReciprocalRank { k } => {
            for (rank, (id, _)) in sparse.iter().enumerate() {
                if let Some(hit) = hits.get_mut(id) {
                    hit.score += 1.0 / (k + (rank + 1) as f32);
                }
            }
            for (rank, (id, _)) in dense.iter().enumerate() {
                if let Some(hit) = hits.get_mut(id) {
                    hit.score += 1.0 / (k + (rank + 1) as f32);
                }
            }
        }
        FusionStrategy::WeightedScore {
            sparse_weight,
            dense_weight,
        } => {
            let sparse_norm = min_max_normalizer(sparse);
            let dense_norm = min_max_normalizer(dense);

            for hit in hits.values_mut() {
                let sparse_component = hit.sparse_score.map(&sparse_norm).unwrap_or(0.0);
                let dense_component = hit.dense_score.map(&dense_norm).unwrap_or(0.0);
                hit.score = sparse_weight * sparse_component + dense_weight * dense_component;
            }
        }
    }

    let mut fused: Vec<FusedHit<K>> = hits.into_values().collect();
    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });

    if max_results > 0 {
        fused.truncate(max_results);
    }

    fused
}

/// Min-max normalizer over a list's scores. Degenerate lists (all scores
/// equal) normalize to 1.0.
fn min_max_normalizer<K>(list: &[(K, f32)]) -> impl Fn(f32) -> f32 {
    let min = list.iter().map(|(_, s)| *s).fold(f32::INFINITY, f32::min);
    let max = list
        .iter()
        .map(|(_, s)| *s)
        .fold(f32::NEG_INFINITY, f32::max);

    move |score: f32| {
        if max > min {
            (score - min) / (max - min)
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rrf_prefers_ids_in_both_lists() {
        let sparse = vec![(1u64, 10.0), (2, 5.0)];
        let dense = vec![(2u64, 0.9), (3, 0.8)];

        let fused = fuse(&FusionStrategy::ReciprocalRank { k: 60.0 }, &sparse, &dense, 0);

        assert_eq!(fused.len(), 3);
        assert_eq!(fused[0].id, 2);
        assert_eq!(fused[0].sparse_score, Some(5.0));
        assert_eq!(fused[0].dense_score, Some(0.9));

        let expected = 1.0 / 62.0 + 1.0 / 61.0;
        assert!((fused[0].score - expected).abs() < 1e-6);
    }

    #[test]
    fn test_rrf_tie_break_by_id() {
        // Ids 1 and 2 each appear once at rank 1.
        let sparse = vec![(2u64, 10.0)];
        let dense = vec![(1u64, 0.9)];

        let fused = fuse(&FusionStrategy::default(), &sparse, &dense, 0);
        assert_eq!(fused[0].id, 1);
        assert_eq!(fused[1].id, 2);
    }

    #[test]
    fn test_weighted_score_normalizes_each_list() {
        let sparse = vec![(1u64, 100.0), (2, 0.0)];
        let dense = vec![(2u64, 1.0), (1, 0.5)];

        let strategy = FusionStrategy::WeightedScore {
            sparse_weight: 0.5,
            dense_weight: 0.5,
        };
        let fused = fuse(&strategy, &sparse, &dense, 0);

        // Id 1: 0.5 * 1.0 + 0.5 * 0.0; id 2: 0.5 * 0.0 + 0.5 * 1.0.
        assert_eq!(fused.len(), 2);
        assert!((fused[0].score - 0.5).abs() < 1e-6);
        assert!((fused[1].score - 0.5).abs() < 1e-6);
        assert_eq!(fused[0].id, 1);
    }

    #[test]
    fn test_weighted_score_degenerate_list() {
        let sparse = vec![(1u64, 3.0), (2, 3.0)];
        let strategy = FusionStrategy::WeightedScore {
            sparse_weight: 1.0,
            dense_weight: 1.0,
        };

        let fused = fuse(&strategy, &sparse, &[], 0);
        assert!((fused[0].score - 1.0).abs() < 1e-6);
        assert!((fused[1].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_max_results_truncates() {
        let sparse = vec![(1u64, 3.0), (2, 2.0), (3, 1.0)];
        let fused = fuse(&FusionStrategy::default(), &sparse, &[], 2);
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn test_empty_inputs() {
        let fused: Vec<FusedHit<u64>> = fuse(&FusionStrategy::default(), &[], &[], 10);
        assert!(fused.is_empty());
    }
}
