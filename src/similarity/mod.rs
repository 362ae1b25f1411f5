// Similarity scoring: normalization, TF-IDF vectors, cosine similarity,
// and shared-term extraction.

pub mod normalize;
pub mod vectorize;
pub mod overlap;
pub mod detection;
