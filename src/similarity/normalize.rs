// Text normalization: turns raw submitted text into a canonical bag of words.
//
// Steps: lowercase, delete every character that is neither alphanumeric nor
// whitespace, split on whitespace, drop English stopwords and single-character
// tokens. The output only ever contains tokens that survive all of these
// steps unchanged, so normalizing an already-normalized text is a no-op.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;
use stop_words::{get, LANGUAGE};

/// Tokens shorter than this are dropped (single letters carry no signal).
pub const MIN_TOKEN_CHARS: usize = 2;

/// English stop words from the stop-words crate.
///
/// Entries with punctuation (e.g. "don't") can never match a stripped token,
/// so they are left out of the set.
static STOP_WORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    get(LANGUAGE::English)
        .iter()
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().all(char::is_alphanumeric))
        .collect()
});

/// A normalized text: the ordered token sequence left after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedText {
    tokens: Vec<String>,
}

impl NormalizedText {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Normalize a raw text. Never fails; empty input gives an empty result.
pub fn normalize(text: &str) -> NormalizedText {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let tokens = stripped
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect();

    NormalizedText { tokens }
}

/// Whether `token` (already lowercased) is an English stop word.
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}
