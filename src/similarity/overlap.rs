// Shared-term extraction: which terms drive a similarity score.
//
// Two rules, one per comparison mode, deliberately kept apart:
//
//   Direct (one text vs one text): a term is shared when both vectors weigh
//   it above zero; its score is the mean of the two weights.
//
//   Database (one text vs corpus): a term qualifies when the query weighs it
//   above zero and at least one corpus vector does too; its score is the
//   mean of the corpus weights only. The query's own weight is not counted.
//
// Both rank by score descending with a stable sort, so equal scores keep
// vocabulary (lexicographic) order, and both truncate to `k` without padding.

use std::cmp::Ordering;

use serde::Serialize;

use super::vectorize::TermVector;

/// A term with its averaged weight across the corpus documents containing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermScore {
    pub term: String,
    pub score: f64,
}

/// A term shared by exactly two documents, with each side's weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedTerm {
    pub term: String,
    /// Mean of `weight_a` and `weight_b`
    pub score: f64,
    pub weight_a: f64,
    pub weight_b: f64,
}

/// Top `k` terms shared by two documents, ranked by mean weight.
pub fn top_shared_terms(a: &TermVector, b: &TermVector, k: usize) -> Vec<SharedTerm> {
    let shared: Vec<SharedTerm> = a
        .iter()
        .filter_map(|(term, weight_a)| {
            b.get(term).map(|weight_b| SharedTerm {
                term: term.to_string(),
                score: (weight_a + weight_b) / 2.0,
                weight_a,
                weight_b,
            })
        })
        .collect();

    rank(shared, k, |t| t.score)
}

/// Top `k` query terms that also occur in the corpus, ranked by their mean
/// weight across the corpus vectors that contain them.
pub fn top_common_terms(query: &TermVector, corpus: &[TermVector], k: usize) -> Vec<TermScore> {
    let mut common = Vec::new();

    for (term, _) in query.iter() {
        let weights: Vec<f64> = corpus.iter().filter_map(|doc| doc.get(term)).collect();
        if weights.is_empty() {
            continue;
        }
        let score = weights.iter().sum::<f64>() / weights.len() as f64;
        common.push(TermScore {
            term: term.to_string(),
            score,
        });
    }

    rank(common, k, |t| t.score)
}

fn rank<T>(mut items: Vec<T>, k: usize, score: impl Fn(&T) -> f64) -> Vec<T> {
    items.sort_by(|a, b| score(b).partial_cmp(&score(a)).unwrap_or(Ordering::Equal));
    items.truncate(k);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(&str, f64)]) -> TermVector {
        TermVector::from_weights(pairs.iter().map(|(t, w)| (*t, *w)))
    }

    #[test]
    fn test_shared_terms_mean_of_both_sides() {
        let a = vector(&[("essay", 0.6), ("source", 0.2), ("only_a", 0.9)]);
        let b = vector(&[("essay", 0.2), ("source", 0.4), ("only_b", 0.9)]);
        let shared = top_shared_terms(&a, &b, 3);
        assert_eq!(shared.len(), 2);
        assert_eq!(shared[0].term, "essay");
        assert!((shared[0].score - 0.4).abs() < 1e-12);
        assert_eq!(shared[0].weight_a, 0.6);
        assert_eq!(shared[0].weight_b, 0.2);
        assert_eq!(shared[1].term, "source");
        assert!((shared[1].score - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_shared_terms_truncates_to_k() {
        let a = vector(&[("a1", 0.1), ("a2", 0.2), ("a3", 0.3), ("a4", 0.4)]);
        let shared = top_shared_terms(&a, &a, 3);
        let terms: Vec<&str> = shared.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, ["a4", "a3", "a2"]);
        assert!(top_shared_terms(&a, &a, 0).is_empty());
    }

    #[test]
    fn test_common_terms_ignore_query_weight() {
        let query = vector(&[("thesis", 0.99), ("draft", 0.01)]);
        let corpus = [
            vector(&[("thesis", 0.2)]),
            vector(&[("thesis", 0.4), ("draft", 0.9)]),
            vector(&[("recipe", 1.0)]),
        ];
        let common = top_common_terms(&query, &corpus, 3);
        assert_eq!(common.len(), 2);
        // draft only appears in one corpus doc, with weight 0.9
        assert_eq!(common[0].term, "draft");
        assert!((common[0].score - 0.9).abs() < 1e-12);
        // thesis averages 0.2 and 0.4; the query's 0.99 is not included
        assert_eq!(common[1].term, "thesis");
        assert!((common[1].score - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_common_terms_requires_query_term() {
        let query = vector(&[("alpha", 0.5)]);
        let corpus = [vector(&[("beta", 0.5)])];
        assert!(top_common_terms(&query, &corpus, 3).is_empty());
        assert!(top_common_terms(&query, &[], 3).is_empty());
    }

    #[test]
    fn test_ties_keep_vocabulary_order() {
        let a = vector(&[("gamma", 0.5), ("alpha", 0.5), ("beta", 0.5)]);
        let shared = top_shared_terms(&a, &a, 3);
        let terms: Vec<&str> = shared.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, ["alpha", "beta", "gamma"]);
    }
}
