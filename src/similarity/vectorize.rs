// TF-IDF vectorization and cosine similarity.
//
// The vocabulary is built from exactly the documents passed to one call:
// the query plus its corpus. Nothing is cached between calls, so scores
// are only comparable within a single call.
//
// Weighting:
//
//   tf(t, d) = raw count of t in d
//   idf(t)   = ln((1 + n) / (1 + df(t))) + 1
//
// where n is the number of documents in the call and df(t) the number of
// those documents containing t. Each document vector is then scaled to unit
// Euclidean length.

use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use serde::Serialize;

use super::normalize::NormalizedText;

/// Sparse TF-IDF weights for one document, keyed by term.
///
/// Only strictly positive weights are stored. Iteration is in lexicographic
/// term order, which is also the vocabulary order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TermVector {
    weights: BTreeMap<String, f64>,
}

impl TermVector {
    /// Build a vector from (term, weight) pairs, keeping only weights > 0.
    pub fn from_weights<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let weights = pairs
            .into_iter()
            .filter(|(_, w)| *w > 0.0)
            .map(|(t, w)| (t.into(), w))
            .collect();
        Self { weights }
    }

    pub fn get(&self, term: &str) -> Option<f64> {
        self.weights.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.weights.contains_key(term)
    }

    /// (term, weight) pairs in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &TermVector) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .weights
            .iter()
            .filter_map(|(t, w)| large.get(t).map(|v| w * v))
            .sum()
    }
}

/// Cosine similarity of two term vectors.
///
/// Returns 0.0 when either vector is zero. Weights are non-negative, so the
/// result lies in [0, 1]; it is clamped to absorb float rounding.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < f64::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(0.0, 1.0)
}

/// Result of fitting TF-IDF over a query and its corpus.
#[derive(Debug, Clone)]
pub struct Scoring {
    /// `similarities[i]` is the cosine similarity of the query and `corpus[i]`.
    pub similarities: Vec<f64>,
    /// `vectors[0]` is the query, `vectors[i + 1]` is `corpus[i]`.
    pub vectors: Vec<TermVector>,
}

impl Scoring {
    pub fn query_vector(&self) -> &TermVector {
        &self.vectors[0]
    }

    pub fn corpus_vectors(&self) -> &[TermVector] {
        &self.vectors[1..]
    }
}

/// Build TF-IDF vectors for a set of documents, in input order.
pub fn vectorize(documents: &[NormalizedText]) -> Result<Vec<TermVector>> {
    let refs: Vec<&NormalizedText> = documents.iter().collect();
    fit(&refs)
}

/// Fit TF-IDF over `query` + `corpus` and score the query against each
/// corpus document.
///
/// An empty corpus gives empty similarities. A query with no terms scores
/// 0.0 against everything.
pub fn fit_and_score(query: &NormalizedText, corpus: &[NormalizedText]) -> Result<Scoring> {
    let documents: Vec<&NormalizedText> = std::iter::once(query).chain(corpus.iter()).collect();
    let vectors = fit(&documents)?;

    let similarities = vectors[1..]
        .iter()
        .map(|doc| cosine_similarity(&vectors[0], doc))
        .collect::<Vec<_>>();

    if let Some(bad) = similarities.iter().find(|s| !s.is_finite()) {
        anyhow::bail!("Cosine similarity produced a non-finite value: {bad}");
    }

    Ok(Scoring {
        similarities,
        vectors,
    })
}

fn fit(documents: &[&NormalizedText]) -> Result<Vec<TermVector>> {
    let n = documents.len() as f64;

    // Raw term counts per document
    let counts: Vec<BTreeMap<&str, u32>> = documents
        .iter()
        .map(|doc| {
            let mut tf: BTreeMap<&str, u32> = BTreeMap::new();
            for token in doc.tokens() {
                *tf.entry(token.as_str()).or_insert(0) += 1;
            }
            tf
        })
        .collect();

    // Document frequency over the joined input set
    let mut df: BTreeMap<&str, u32> = BTreeMap::new();
    for tf in &counts {
        let unique: HashSet<&str> = tf.keys().copied().collect();
        for term in unique {
            *df.entry(term).or_insert(0) += 1;
        }
    }

    let mut vectors = Vec::with_capacity(counts.len());
    for tf in &counts {
        let raw: Vec<(&str, f64)> = tf
            .iter()
            .map(|(term, count)| {
                let doc_freq = f64::from(df.get(term).copied().unwrap_or(0));
                let idf = ((1.0 + n) / (1.0 + doc_freq)).ln() + 1.0;
                (*term, f64::from(*count) * idf)
            })
            .collect();

        let norm = raw.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if !norm.is_finite() {
            anyhow::bail!("TF-IDF weighting produced a non-finite norm");
        }

        let vector = if norm > 0.0 {
            TermVector::from_weights(raw.into_iter().map(|(t, w)| (t, w / norm)))
        } else {
            TermVector::default()
        };
        vectors.push(vector);
    }

    Ok(vectors)
}
