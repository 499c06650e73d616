//! Fixed English stopword set, generated from `config/stopwords.toml` at build time.

use std::collections::HashSet;

use once_cell::sync::Lazy;

include!(concat!(env!("OUT_DIR"), "/stopwords.rs"));

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| ENGLISH.iter().copied().collect());

/// True when `word` is an English stopword. Expects an already-lowercased token.
pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}

/// The full stopword list in source order.
pub fn english() -> &'static [&'static str] {
    ENGLISH
}
