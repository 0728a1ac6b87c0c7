//! Candidate aggregator (§4.5).
//!
//! Rolls recognizer detections across images into a ranked co-appearance
//! list per frontier Person, merged across every query issued from that
//! Person. Excludes the two endpoints, anyone already in the chain, and
//! anyone in the failed-candidates set.

use crate::cache::CoAppearanceTally;
use crate::person::Person;
use std::collections::{HashMap, HashSet};

/// A candidate ranked by its aggregated co-appearance tally.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub name: String,
    pub count: u32,
    pub best_confidence: f32,
}

/// Per-frontier-Person co-appearance accumulator.
#[derive(Debug, Default)]
pub struct Aggregator {
    tallies: HashMap<String, CoAppearanceTally>,
    /// Maps a normalized key back to the display name first seen for it.
    display_names: HashMap<String, String>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one co-appearance observation for `name` at `confidence`.
    pub fn record(&mut self, name: &str, confidence: f32) {
        let key = crate::person::normalize_name(name);
        self.display_names
            .entry(key.clone())
            .or_insert_with(|| name.to_string());
        self.tallies.entry(key).or_default().record(confidence);
    }

    pub fn merge(&mut self, other: &HashMap<String, CoAppearanceTally>, names: &HashMap<String, String>) {
        for (key, tally) in other {
            let entry = self.tallies.entry(key.clone()).or_default();
            entry.count += tally.count;
            entry.best_confidence = entry.best_confidence.max(tally.best_confidence);
            if let Some(name) = names.get(key) {
                self.display_names.entry(key.clone()).or_insert_with(|| name.clone());
            }
        }
    }

    /// Ranked candidates sorted by (count desc, best_confidence desc, name
    /// asc), excluding `a`, `b`, anyone already in `chain`, and anyone in
    /// `failed_candidates`.
    pub fn ranked(
        &self,
        a: &Person,
        b: &Person,
        chain: &[Person],
        failed_candidates: &HashSet<String>,
    ) -> Vec<RankedCandidate> {
        let excluded: HashSet<&str> = chain
            .iter()
            .map(|p| p.key.as_str())
            .chain([a.key.as_str(), b.key.as_str()])
            .collect();

        let mut candidates: Vec<RankedCandidate> = self
            .tallies
            .iter()
            .filter(|(key, _)| !excluded.contains(key.as_str()))
            .filter(|(key, _)| !failed_candidates.contains(key.as_str()))
            .map(|(key, tally)| RankedCandidate {
                name: self
                    .display_names
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| key.clone()),
                count: tally.count,
                best_confidence: tally.best_confidence,
            })
            .collect();

        candidates.sort_by(|x, y| {
            y.count
                .cmp(&x.count)
                .then_with(|| {
                    y.best_confidence
                        .partial_cmp(&x.best_confidence)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| x.name.cmp(&y.name))
        });

        candidates
    }
}
