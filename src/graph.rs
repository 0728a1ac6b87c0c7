//! Search graph (§4.3, §9.1).
//!
//! Nodes are keyed by normalized name rather than linked by parent/child
//! pointers — a Person discovered down two different branches collapses
//! into the same node, and the frontier is a priority ordering over nodes,
//! not a tree. Best-first order is (chain confidence desc, depth asc,
//! insertion order asc), so ties fall back to discovery order for
//! determinism.

use crate::confidence::VerifiedEdge;
use crate::person::Person;
use std::collections::{HashMap, HashSet};

/// A node reached during the search, with the best chain found to it so far.
#[derive(Debug, Clone)]
pub struct FrontierNode {
    pub person: Person,
    pub depth: u32,
    /// min(edge-confidence) over the chain from the start person to here.
    pub chain_confidence: f32,
    /// Key of the node this one was reached from, for path reconstruction.
    pub came_from: Option<String>,
    /// Monotonic insertion counter, used as the final tiebreaker.
    pub sequence: u64,
}

/// Undirected, arena-backed graph of discovered Persons and verified edges.
///
/// Nodes never hold pointers to each other; all traversal goes through
/// `adjacency`, keyed by normalized name.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: HashMap<String, Person>,
    adjacency: HashMap<String, Vec<VerifiedEdge>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, person: &Person) -> bool {
        self.nodes.contains_key(&person.key)
    }

    pub fn get(&self, key: &str) -> Option<&Person> {
        self.nodes.get(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert a verified edge, adding its endpoints as nodes if new.
    pub fn add_edge(&mut self, edge: VerifiedEdge) {
        self.nodes
            .entry(edge.a.key.clone())
            .or_insert_with(|| edge.a.clone());
        self.nodes
            .entry(edge.b.key.clone())
            .or_insert_with(|| edge.b.clone());
        self.adjacency
            .entry(edge.a.key.clone())
            .or_default()
            .push(edge.clone());
        self.adjacency.entry(edge.b.key.clone()).or_default().push(edge);
    }

    /// Edges incident to `person`, in insertion order.
    pub fn edges_of(&self, person: &Person) -> &[VerifiedEdge] {
        self.adjacency
            .get(&person.key)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Reconstruct the chain of edges from `start` to `end` by walking
    /// `came_from` pointers recorded in `visited`, oldest edge first.
    pub fn reconstruct_path(
        &self,
        visited: &HashMap<String, FrontierNode>,
        end: &Person,
    ) -> Vec<VerifiedEdge> {
        let mut chain = Vec::new();
        let mut current = end.key.clone();
        while let Some(node) = visited.get(&current) {
            let Some(parent_key) = node.came_from.clone() else {
                break;
            };
            let edge = self
                .edges_of(&node.person)
                .iter()
                .find(|e| e.other(&node.person).is_some_and(|o| o.key == parent_key))
                .expect("came_from must reference an edge actually added to the graph");
            chain.push(edge.clone());
            current = parent_key;
        }
        chain.reverse();
        chain
    }
}

/// Best-first frontier over `FrontierNode`s: pops highest chain-confidence
/// first, then shallowest depth, then earliest insertion.
#[derive(Debug, Default)]
pub struct Frontier {
    nodes: Vec<FrontierNode>,
    next_sequence: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn push(&mut self, person: Person, depth: u32, chain_confidence: f32, came_from: Option<String>) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.nodes.push(FrontierNode {
            person,
            depth,
            chain_confidence,
            came_from,
            sequence,
        });
    }

    /// Remove and return the best-ranked node, if any.
    pub fn pop(&mut self) -> Option<FrontierNode> {
        let best_index = self
            .nodes
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| compare_nodes(a, b))
            .map(|(i, _)| i)?;
        Some(self.nodes.remove(best_index))
    }
}

fn compare_nodes(a: &FrontierNode, b: &FrontierNode) -> std::cmp::Ordering {
    a.chain_confidence
        .partial_cmp(&b.chain_confidence)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| b.depth.cmp(&a.depth)) // shallower depth wins, so reverse
        .then_with(|| b.sequence.cmp(&a.sequence)) // earlier insertion wins, so reverse
}

/// The set of normalized keys that have already been expanded, so the
/// search never revisits a Person once its edges have been explored.
#[derive(Debug, Default)]
pub struct Visited {
    keys: HashSet<String>,
}

impl Visited {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, person: &Person) -> bool {
        self.keys.contains(&person.key)
    }

    pub fn insert(&mut self, person: &Person) -> bool {
        self.keys.insert(person.key.clone())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::{BoundingBox, DetectedCelebrity, EvidenceRecord, ImageAnalysis, ImageCandidate};

    fn evidence(score: f32) -> EvidenceRecord {
        let candidate = ImageCandidate {
            image_url: "https://x/y.jpg".into(),
            thumbnail_url: None,
            context_url: "https://x/y".into(),
            title: None,
        };
        let bbox = BoundingBox {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        };
        EvidenceRecord {
            image: ImageAnalysis::new(
                candidate,
                vec![DetectedCelebrity::new("x", score, bbox)],
            ),
            confidence_a: score,
            confidence_b: score,
            image_score: score,
        }
    }

    #[test]
    fn frontier_pops_highest_confidence_first() {
        let mut frontier = Frontier::new();
        frontier.push(Person::new("Low"), 1, 50.0, None);
        frontier.push(Person::new("High"), 1, 90.0, None);
        frontier.push(Person::new("Mid"), 1, 70.0, None);
        assert_eq!(frontier.pop().unwrap().person.display_name, "High");
        assert_eq!(frontier.pop().unwrap().person.display_name, "Mid");
        assert_eq!(frontier.pop().unwrap().person.display_name, "Low");
    }

    #[test]
    fn frontier_breaks_confidence_ties_by_shallower_depth() {
        let mut frontier = Frontier::new();
        frontier.push(Person::new("Deep"), 3, 80.0, None);
        frontier.push(Person::new("Shallow"), 1, 80.0, None);
        assert_eq!(frontier.pop().unwrap().person.display_name, "Shallow");
    }

    #[test]
    fn frontier_breaks_remaining_ties_by_insertion_order() {
        let mut frontier = Frontier::new();
        frontier.push(Person::new("First"), 1, 80.0, None);
        frontier.push(Person::new("Second"), 1, 80.0, None);
        assert_eq!(frontier.pop().unwrap().person.display_name, "First");
    }

    #[test]
    fn visited_tracks_membership_once() {
        let mut visited = Visited::new();
        let p = Person::new("Elon Musk");
        assert!(!visited.contains(&p));
        assert!(visited.insert(&p));
        assert!(visited.contains(&p));
        assert!(!visited.insert(&p));
    }

    #[test]
    fn graph_add_edge_registers_both_endpoints() {
        let mut graph = Graph::new();
        let a = Person::new("A");
        let b = Person::new("B");
        let edge = VerifiedEdge::new(a.clone(), b.clone(), vec![evidence(90.0)]).unwrap();
        graph.add_edge(edge);
        assert!(graph.contains(&a));
        assert!(graph.contains(&b));
        assert_eq!(graph.edges_of(&a).len(), 1);
        assert_eq!(graph.edges_of(&b).len(), 1);
    }

    #[test]
    fn reconstruct_path_walks_came_from_chain() {
        let mut graph = Graph::new();
        let a = Person::new("A");
        let b = Person::new("B");
        let c = Person::new("C");
        let e1 = VerifiedEdge::new(a.clone(), b.clone(), vec![evidence(90.0)]).unwrap();
        let e2 = VerifiedEdge::new(b.clone(), c.clone(), vec![evidence(88.0)]).unwrap();
        graph.add_edge(e1);
        graph.add_edge(e2);

        let mut visited = HashMap::new();
        visited.insert(
            a.key.clone(),
            FrontierNode {
                person: a.clone(),
                depth: 0,
                chain_confidence: f32::MAX,
                came_from: None,
                sequence: 0,
            },
        );
        visited.insert(
            b.key.clone(),
            FrontierNode {
                person: b.clone(),
                depth: 1,
                chain_confidence: 90.0,
                came_from: Some(a.key.clone()),
                sequence: 1,
            },
        );
        visited.insert(
            c.key.clone(),
            FrontierNode {
                person: c.clone(),
                depth: 2,
                chain_confidence: 88.0,
                came_from: Some(b.key.clone()),
                sequence: 2,
            },
        );

        let chain = graph.reconstruct_path(&visited, &c);
        assert_eq!(chain.len(), 2);
        assert!(chain[0].connects(&a, &b));
        assert!(chain[1].connects(&b, &c));
    }
}
