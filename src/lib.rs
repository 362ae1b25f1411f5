// Verbatim: plagiarism detection with TF-IDF cosine similarity.
//
// This is the library root. `similarity` holds the scoring pipeline; the
// other modules are the storage, presentation and HTTP layers around it.

pub mod config;
pub mod db;
pub mod output;
pub mod similarity;
pub mod status;

#[cfg(feature = "web")]
pub mod web;
