//! Text normalization — the cleaning step every analysis runs before inference.
//!
//! Ordered substitutions (URLs, then emails, then symbols) followed by
//! whitespace tokenization, stopword removal and first-occurrence dedup.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::stopwords::is_stopword;

// `[\n\S]`: a URL at the end of a line also swallows the next line's first word.
static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:https?|ftp)://[\n\S]+").unwrap());

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

// Anything that is neither an ASCII word character nor whitespace.
static SYMBOL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s]").unwrap());

/// Reduce raw text to a lowercase, stopword-free, deduplicated token string.
///
/// URL and email stripping must run before symbol stripping: once `:`, `/`
/// and `@` are gone the address patterns no longer match.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_urls = URL_PATTERN.replace_all(&lowered, "");
    let without_emails = EMAIL_PATTERN.replace_all(&without_urls, "");
    let stripped = SYMBOL_PATTERN.replace_all(&without_emails, "");

    join_unique(stripped.split_whitespace().filter(|token| !is_stopword(token)))
}

/// Split on whitespace, drop repeated tokens (exact match, first occurrence
/// wins) and rejoin with single spaces.
pub fn dedupe_tokens(text: &str) -> String {
    join_unique(text.split_whitespace())
}

fn join_unique<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    let mut seen = HashSet::new();
    tokens
        .filter(|token| seen.insert(*token))
        .collect::<Vec<&str>>()
        .join(" ")
}
