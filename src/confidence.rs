//! Data model and confidence calculus (§3, §4.2).
//!
//! `image-score = min(confidence_A, confidence_B)`,
//! `edge-confidence = max(image-score)` over the edge's evidence,
//! `path-confidence = min(edge-confidence)` along the path.

use crate::person::{names_match, normalize_name, Person};
use serde::{Deserialize, Serialize};

/// A bounding box for a detected face, in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A (name, confidence, bounding-box) triple produced by the recognizer for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedCelebrity {
    pub name: String,
    /// Confidence as a percentage, 0..=100.
    pub confidence: f32,
    pub bounding_box: BoundingBox,
}

impl DetectedCelebrity {
    pub fn new(name: impl Into<String>, confidence: f32, bounding_box: BoundingBox) -> Self {
        Self {
            name: name.into(),
            confidence,
            bounding_box,
        }
    }
}

/// Tuple returned by the search provider for one candidate image.
///
/// A candidate with a missing `image_url` or `context_url` is discarded by
/// the search layer before it ever reaches an `ImageAnalysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageCandidate {
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub context_url: String,
    pub title: Option<String>,
}

impl ImageCandidate {
    /// Whether this candidate carries the URLs required to be usable.
    pub fn is_usable(&self) -> bool {
        !self.image_url.trim().is_empty() && !self.context_url.trim().is_empty()
    }
}

/// An `ImageCandidate` together with the detections the recognizer produced for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub candidate: ImageCandidate,
    pub detections: Vec<DetectedCelebrity>,
}

impl ImageAnalysis {
    pub fn new(candidate: ImageCandidate, detections: Vec<DetectedCelebrity>) -> Self {
        Self {
            candidate,
            detections,
        }
    }

    /// Returns the first detection matching `name` at or above `threshold`,
    /// breaking ties by highest confidence (§4.1 `find_celebrity`).
    pub fn find_celebrity(&self, name: &str, threshold: f32) -> Option<&DetectedCelebrity> {
        let key = normalize_name(name);
        self.detections
            .iter()
            .filter(|d| names_match(&normalize_name(&d.name), &key) && d.confidence >= threshold)
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// `is_valid_evidence` (§4.2): both `a` and `b` must be found at or above `threshold`.
    pub fn is_valid_evidence(&self, a: &str, b: &str, threshold: f32) -> bool {
        self.find_celebrity(a, threshold).is_some() && self.find_celebrity(b, threshold).is_some()
    }
}

/// An `ImageAnalysis` for which both named targets were detected at or above
/// threshold, together with `image_score = min(confidence_a, confidence_b)`.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub image: ImageAnalysis,
    pub confidence_a: f32,
    pub confidence_b: f32,
    pub image_score: f32,
}

impl EvidenceRecord {
    /// Build an `EvidenceRecord` from an analysis already known to be valid
    /// evidence for `a`/`b`, or `None` if it is not.
    pub fn from_analysis(image: ImageAnalysis, a: &str, b: &str, threshold: f32) -> Option<Self> {
        let conf_a = image.find_celebrity(a, threshold)?.confidence;
        let conf_b = image.find_celebrity(b, threshold)?.confidence;
        let image_score = conf_a.min(conf_b);
        Some(Self {
            image,
            confidence_a: conf_a,
            confidence_b: conf_b,
            image_score,
        })
    }
}

/// An undirected, visually verified link between two Persons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedEdge {
    pub a: Person,
    pub b: Person,
    pub evidence: Vec<EvidenceRecord>,
}

impl VerifiedEdge {
    /// Construct a `VerifiedEdge` from a non-empty evidence list.
    pub fn new(a: Person, b: Person, evidence: Vec<EvidenceRecord>) -> Option<Self> {
        if evidence.is_empty() {
            return None;
        }
        Some(Self { a, b, evidence })
    }

    /// `edge-confidence = max(image-score)` across the edge's evidence.
    pub fn confidence(&self) -> f32 {
        self.evidence
            .iter()
            .map(|e| e.image_score)
            .fold(f32::MIN, f32::max)
    }

    /// The evidence record achieving `edge-confidence` (argmax image-score).
    pub fn best_evidence(&self) -> &EvidenceRecord {
        self.evidence
            .iter()
            .max_by(|x, y| {
                x.image_score
                    .partial_cmp(&y.image_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("VerifiedEdge invariant: evidence is non-empty")
    }

    /// Whether this edge connects the unordered pair `{x, y}`.
    pub fn connects(&self, x: &Person, y: &Person) -> bool {
        (self.a == *x && self.b == *y) || (self.a == *y && self.b == *x)
    }

    /// The other endpoint of the edge given one of its endpoints.
    pub fn other(&self, from: &Person) -> Option<&Person> {
        if self.a == *from {
            Some(&self.b)
        } else if self.b == *from {
            Some(&self.a)
        } else {
            None
        }
    }
}

/// An ordered sequence of Persons with adjacent VerifiedEdges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub people: Vec<Person>,
    pub edges: Vec<VerifiedEdge>,
}

impl Path {
    pub fn new(people: Vec<Person>, edges: Vec<VerifiedEdge>) -> Self {
        Self { people, edges }
    }

    /// Hop count (k), i.e. number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// `path-confidence = min(edge-confidence)` along the path.
    pub fn confidence(&self) -> f32 {
        self.edges
            .iter()
            .map(|e| e.confidence())
            .fold(f32::MAX, f32::min)
    }
}
