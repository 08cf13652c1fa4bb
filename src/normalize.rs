//! Comparison-string canonicalization
//!
//! Every similarity score in the engine is computed over normalized text:
//! lower-cased, stripped of everything but letters, digits and spaces, with
//! runs of whitespace collapsed to a single space.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Canonicalize raw text for comparison. Pure and deterministic.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            for lc in ch.to_lowercase() {
                out.push(lc);
            }
        } else if ch.is_whitespace() {
            out.push(' ');
        }
        // punctuation dropped
    }
    WHITESPACE.replace_all(out.trim(), " ").into_owned()
}

/// Join name/address components into one comparison string, skipping
/// empty parts so missing fields never leave double spaces behind.
pub fn join_components<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
