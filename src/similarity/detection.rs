// Detection pipeline: the two request shapes built from the scoring pieces.
//
//   detect_against_corpus: one submitted text vs every stored document
//   compare_texts:         one submitted text vs one other submitted text
//
// Each call normalizes its inputs, fits TF-IDF once over exactly those
// inputs, and returns plain data. Nothing is kept between calls.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use super::normalize::{normalize, NormalizedText};
use super::overlap::{top_common_terms, top_shared_terms, SharedTerm, TermScore};
use super::vectorize::{fit_and_score, Scoring};

/// How many shared terms each report carries.
pub const TOP_TERMS: usize = 3;

/// One stored document paired with its similarity to the submitted text.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMatch {
    pub text: String,
    pub score: f64,
}

/// Result of checking a text against the stored corpus.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusReport {
    /// One entry per corpus document, in corpus order
    pub matches: Vec<DocumentMatch>,
    pub top_common_terms: Vec<TermScore>,
}

impl CorpusReport {
    /// The similarity scores alone, in corpus order.
    pub fn scores(&self) -> Vec<f64> {
        self.matches.iter().map(|m| m.score).collect()
    }

    /// The highest-scoring document (first one on ties).
    pub fn best_match(&self) -> Option<&DocumentMatch> {
        self.matches
            .iter()
            .reduce(|best, m| if m.score > best.score { m } else { best })
    }
}

/// Result of comparing two texts directly.
#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    pub similarity: f64,
    pub top_common_terms: Vec<SharedTerm>,
}

impl PairReport {
    pub fn similarity_percent(&self) -> f64 {
        self.similarity * 100.0
    }
}

/// Score `user_text` against every text in `corpus`.
pub fn detect_against_corpus(user_text: &str, corpus: &[String]) -> Result<CorpusReport> {
    let query = normalize(user_text);
    let normalized: Vec<NormalizedText> = corpus.iter().map(|t| normalize(t)).collect();

    let Scoring {
        similarities,
        vectors,
    } = fit_and_score(&query, &normalized)?;

    let top_common_terms = top_common_terms(&vectors[0], &vectors[1..], TOP_TERMS);

    let matches: Vec<DocumentMatch> = corpus
        .iter()
        .zip(similarities)
        .map(|(text, score)| DocumentMatch {
            text: text.clone(),
            score,
        })
        .collect();

    let report = CorpusReport {
        matches,
        top_common_terms,
    };

    debug!(
        documents = corpus.len(),
        query_terms = query.len(),
        best_score = report.best_match().map(|m| m.score).unwrap_or(0.0),
        "Scored text against corpus"
    );

    Ok(report)
}

/// Score two texts against each other.
pub fn compare_texts(text_a: &str, text_b: &str) -> Result<PairReport> {
    let a = normalize(text_a);
    let b = normalize(text_b);

    let scoring = fit_and_score(&a, std::slice::from_ref(&b))?;
    let similarity = scoring.similarities.first().copied().unwrap_or(0.0);
    let top_common_terms = top_shared_terms(
        scoring.query_vector(),
        &scoring.corpus_vectors()[0],
        TOP_TERMS,
    );

    debug!(
        terms_a = a.len(),
        terms_b = b.len(),
        similarity,
        "Compared two texts"
    );

    Ok(PairReport {
        similarity,
        top_common_terms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_report_keeps_original_text_and_order() {
        let corpus = vec![
            "Recipes for Sourdough!".to_string(),
            "Citation styles for a THESIS".to_string(),
        ];
        let report = detect_against_corpus("thesis citation styles", &corpus).unwrap();
        assert_eq!(report.matches.len(), 2);
        assert_eq!(report.matches[0].text, "Recipes for Sourdough!");
        assert_eq!(report.matches[1].text, "Citation styles for a THESIS");
        assert!(report.matches[1].score > report.matches[0].score);
        assert_eq!(report.best_match().unwrap().text, corpus[1]);
        assert_eq!(report.scores().len(), 2);
    }

    #[test]
    fn test_corpus_report_empty_corpus() {
        let report = detect_against_corpus("anything at all", &[]).unwrap();
        assert!(report.matches.is_empty());
        assert!(report.top_common_terms.is_empty());
        assert!(report.best_match().is_none());
    }

    #[test]
    fn test_pair_report_percent() {
        let report = compare_texts("identical manuscript text", "identical manuscript text").unwrap();
        assert!((report.similarity - 1.0).abs() < 1e-9);
        assert!((report.similarity_percent() - 100.0).abs() < 1e-6);
        assert!(!report.top_common_terms.is_empty());
        assert!(report.top_common_terms.len() <= TOP_TERMS);
    }

    #[test]
    fn test_pair_report_empty_texts() {
        let report = compare_texts("", "").unwrap();
        assert_eq!(report.similarity, 0.0);
        assert!(report.top_common_terms.is_empty());
    }
}
