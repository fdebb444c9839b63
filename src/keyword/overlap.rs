//! Redundancy scoring for extracted keyword sets.
//!
//! An extracted keyword set is penalized for near-duplicate entries: pairs
//! where one keyword contains the other, or whose word sets are nearly
//! identical under Jaccard similarity. The result is folded into the
//! n-gram goodness score by the
//! [`optimizer`](crate::keyword::optimizer) module.

use std::collections::HashSet;

use crate::keyword::extractor::Keyword;

/// Default Jaccard similarity threshold above which a keyword pair counts
/// as redundant.
pub const DEFAULT_JACCARD_THRESHOLD: f64 = 0.7;

/// Score the redundancy of a keyword set.
///
/// Returns a value in `[0.0, 1.0]` where `1.0` means no redundancy among
/// the keywords and `0.0` means maximal redundancy. Keyword text is
/// compared case-insensitively.
///
/// A pair of keywords counts as a collision when either string contains
/// the other, or when the Jaccard similarity of their whitespace-delimited
/// word sets reaches `jaccard_threshold`. The collision count is
/// normalized by the number of unordered pairs `n(n-1)/2`.
///
/// Sets with fewer than two keywords have no pairs and score `0.0`.
///
/// # Examples
///
/// ```
/// use sagitta::keyword::extractor::Keyword;
/// use sagitta::keyword::overlap::{DEFAULT_JACCARD_THRESHOLD, overlap_score};
///
/// let keywords = vec![
///     Keyword::new("vector search", 0.1),
///     Keyword::new("inverted index", 0.2),
/// ];
/// let score = overlap_score(&keywords, DEFAULT_JACCARD_THRESHOLD);
/// assert_eq!(score, 1.0);
/// ```
pub fn overlap_score(keywords: &[Keyword], jaccard_threshold: f64) -> f64 {
    let keywords: Vec<String> = keywords.iter().map(|k| k.text.to_lowercase()).collect();
    let num_keywords = keywords.len();

    if num_keywords <= 1 {
        return 0.0;
    }

    // Normalization denominator: number of unordered pairs.
    let max_keyword_combinations = (num_keywords * (num_keywords - 1)) as f64 / 2.0;
    if max_keyword_combinations == 0.0 {
        return 0.0;
    }

    let mut penalty = 0u64;

    for (i, ki) in keywords.iter().enumerate() {
        for kj in keywords.iter().skip(i + 1) {
            if ki.contains(kj.as_str()) || kj.contains(ki.as_str()) {
                penalty += 1;
                continue;
            }

            let words1: HashSet<&str> = ki.split_whitespace().collect();
            let words2: HashSet<&str> = kj.split_whitespace().collect();

            if words1.is_empty() || words2.is_empty() {
                continue;
            }

            let intersection = words1.intersection(&words2).count();
            let union = words1.union(&words2).count();
            if union == 0 {
                continue;
            }

            let jaccard_similarity = intersection as f64 / union as f64;
            if jaccard_similarity >= jaccard_threshold {
                penalty += 1;
            }
        }
    }

    1.0 - (penalty as f64 / max_keyword_combinations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(text: &str) -> Keyword {
        Keyword::new(text, 0.1)
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(overlap_score(&[], DEFAULT_JACCARD_THRESHOLD), 0.0);
    }

    #[test]
    fn test_single_keyword() {
        let keywords = vec![kw("retrieval")];
        assert_eq!(overlap_score(&keywords, DEFAULT_JACCARD_THRESHOLD), 0.0);
    }

    #[test]
    fn test_identical_pair_is_maximal_redundancy() {
        let keywords = vec![kw("vector search"), kw("vector search")];
        assert_eq!(overlap_score(&keywords, DEFAULT_JACCARD_THRESHOLD), 0.0);
    }

    #[test]
    fn test_substring_collision_is_case_insensitive() {
        let keywords = vec![kw("Vector"), kw("vector search")];
        assert_eq!(overlap_score(&keywords, DEFAULT_JACCARD_THRESHOLD), 0.0);
    }

    #[test]
    fn test_disjoint_keywords_score_one() {
        let keywords = vec![kw("sparse retrieval"), kw("dense embedding")];
        assert_eq!(overlap_score(&keywords, DEFAULT_JACCARD_THRESHOLD), 1.0);
    }

    #[test]
    fn test_jaccard_collision() {
        // Word sets {hybrid, search, engine} and {hybrid, search, system}
        // share 2 of 4 words: similarity 0.5.
        let keywords = vec![kw("hybrid search engine"), kw("hybrid search system")];
        assert_eq!(overlap_score(&keywords, 0.5), 0.0);
        assert_eq!(overlap_score(&keywords, 0.7), 1.0);
    }

    #[test]
    fn test_symmetric_under_reordering() {
        let forward = vec![kw("sparse retrieval"), kw("retrieval"), kw("embedding")];
        let reversed: Vec<Keyword> = forward.iter().rev().cloned().collect();

        assert_eq!(
            overlap_score(&forward, DEFAULT_JACCARD_THRESHOLD),
            overlap_score(&reversed, DEFAULT_JACCARD_THRESHOLD)
        );
    }

    #[test]
    fn test_partial_redundancy() {
        // One colliding pair out of three.
        let keywords = vec![kw("vector"), kw("vector index"), kw("ranking")];
        let score = overlap_score(&keywords, DEFAULT_JACCARD_THRESHOLD);
        assert!((score - (1.0 - 1.0 / 3.0)).abs() < 1e-9);
    }
}
