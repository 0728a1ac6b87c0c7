//! Person identity and name matching (§4.1).
//!
//! Normalization lowercases, trims, collapses internal whitespace, strips
//! punctuation, folds accents, and drops common honorifics. Two names match
//! when their normalized keys are equal, or when one key's tokens are a
//! contiguous subsequence of the other.

use deunicode::deunicode;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static RE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid regex"));

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "miss", "dr", "sir", "dame", "jr", "sr", "ii", "iii", "iv",
];

/// A canonical display name plus the normalized key used for matching.
///
/// Two Persons are equal iff their normalized keys are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub display_name: String,
    pub key: String,
}

impl Person {
    pub fn new(display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        let key = normalize_name(&display_name);
        Self { display_name, key }
    }
}

impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Person {}

impl std::hash::Hash for Person {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Normalize a name into its matching key.
///
/// Pipeline: accent-fold -> lowercase -> strip punctuation -> strip
/// honorific tokens -> collapse whitespace.
pub fn normalize_name(name: &str) -> String {
    let latin = deunicode(name);
    let lower = latin.to_lowercase();
    let stripped = RE_PUNCTUATION.replace_all(&lower, " ");
    let tokens: Vec<&str> = stripped
        .split_whitespace()
        .filter(|t| !HONORIFICS.contains(t))
        .collect();
    let joined = tokens.join(" ");
    RE_WHITESPACE.replace_all(joined.trim(), " ").to_string()
}

/// Tokenize an already-normalized key.
fn tokens(key: &str) -> Vec<&str> {
    key.split_whitespace().collect()
}

/// Whether `needle`'s tokens appear as a contiguous subsequence of `haystack`'s tokens.
fn is_contiguous_subsequence(needle: &[&str], haystack: &[&str]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

/// Two normalized keys match iff they are equal, or one's tokens are a
/// contiguous subsequence of the other's (tolerating added middle names or
/// dropped suffixes).
pub fn names_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let ta = tokens(a);
    let tb = tokens(b);
    is_contiguous_subsequence(&ta, &tb) || is_contiguous_subsequence(&tb, &ta)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn name_like() -> impl Strategy<Value = String> {
        "[A-Za-z]{1,12}( [A-Za-z]{1,12}){0,2}"
    }

    proptest! {
        /// Normalization is idempotent: keys are already in normal form.
        #[test]
        fn normalize_name_is_idempotent(name in name_like()) {
            let once = normalize_name(&name);
            let twice = normalize_name(&once);
            prop_assert_eq!(once, twice);
        }

        /// A normalized key always matches itself.
        #[test]
        fn names_match_is_reflexive(name in name_like()) {
            let key = normalize_name(&name);
            prop_assume!(!key.is_empty());
            prop_assert!(names_match(&key, &key));
        }

        /// Matching does not depend on argument order.
        #[test]
        fn names_match_is_symmetric(a in name_like(), b in name_like()) {
            let ka = normalize_name(&a);
            let kb = normalize_name(&b);
            prop_assert_eq!(names_match(&ka, &kb), names_match(&kb, &ka));
        }
    }
}
