//! Per-run query cache (§4.9).
//!
//! Memoizes `(verifier, query)` outcomes within a single run so re-issuing
//! the same query returns the cached outcome instead of repeating provider
//! calls. Entries are immutable for the lifetime of the run — there is no
//! TTL/expiry, since a run is a short-lived bounded computation and the
//! whole cache is dropped with it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::confidence::VerifiedEdge;
use crate::person::Person;

/// Cache key derived from the verifier pair and the issued query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(pub String);

impl CacheKey {
    /// Generate a cache key from the two normalized participant keys and
    /// the query string. Order-independent in the participants so that
    /// verifying {A,B} and {B,A} hit the same entry.
    pub fn generate(a_key: &str, b_key: &str, query: &str) -> Self {
        let (first, second) = if a_key <= b_key {
            (a_key, b_key)
        } else {
            (b_key, a_key)
        };

        let mut hasher = Sha256::new();
        hasher.update(first.as_bytes());
        hasher.update(b"\0");
        hasher.update(second.as_bytes());
        hasher.update(b"\0");
        hasher.update(query.as_bytes());
        let hash = hasher.finalize();
        CacheKey(format!("{hash:x}"))
    }
}

/// Co-appearance tally for one other detected celebrity (§4.4 step 2e).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoAppearanceTally {
    pub count: u32,
    pub best_confidence: f32,
}

impl CoAppearanceTally {
    pub fn record(&mut self, confidence: f32) {
        self.count += 1;
        self.best_confidence = self.best_confidence.max(confidence);
    }
}

/// The memoized outcome of one `verify_pair(A, B, query)` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifierOutcome {
    pub edge: Option<VerifiedEdge>,
    pub co_appearances: HashMap<String, CoAppearanceTally>,
}

/// Per-run memoization of verifier query outcomes.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<CacheKey, VerifierOutcome>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, a: &Person, b: &Person, query: &str) -> Option<&VerifierOutcome> {
        let key = CacheKey::generate(&a.key, &b.key, query);
        self.entries.get(&key)
    }

    pub fn insert(&mut self, a: &Person, b: &Person, query: &str, outcome: VerifierOutcome) {
        let key = CacheKey::generate(&a.key, &b.key, query);
        self.entries.insert(key, outcome);
    }

    pub fn contains(&self, a: &Person, b: &Person, query: &str) -> bool {
        let key = CacheKey::generate(&a.key, &b.key, query);
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
