//! Planner contract and heuristic fallback (§4.6).
//!
//! The orchestrator never consumes a raw planner response directly — it
//! validates it into a `PlannerPlan`, falling back to the heuristic on any
//! error, timeout, malformed output, or absent planner. `PlannerResult`
//! exists so that fallback is a value, not a side effect buried in error
//! handling.

use crate::aggregator::RankedCandidate;
use crate::confidence::VerifiedEdge;
use crate::person::Person;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Everything the planner needs to decide the next move from one frontier Person.
#[derive(Debug, Clone)]
pub struct PlannerInput {
    pub source: Person,
    pub target: Person,
    pub frontier_person: Person,
    pub hops_used: u32,
    pub hop_limit: u32,
    pub confidence_threshold: f32,
    pub images_searched_remaining: u32,
    pub images_recognized_remaining: u32,
    pub planner_calls_remaining: u32,
    pub verified_edges: Vec<VerifiedEdge>,
    pub failed_candidates: HashSet<String>,
    pub ranked_candidates: Vec<RankedCandidate>,
}

/// A validated plan the orchestrator acts on directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerPlan {
    pub next_candidates: Vec<String>,
    pub search_queries: Vec<String>,
    pub narration: String,
    pub stop: bool,
    pub reason: String,
}

/// The raw shape a planner implementation returns, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerOutput {
    pub next_candidates: Vec<String>,
    pub search_queries: Vec<String>,
    pub narration: String,
    pub stop: bool,
    pub reason: String,
}

/// Outcome of asking a configured planner for a plan.
///
/// `Fallback` makes the "the LLM didn't give us anything usable" path an
/// explicit value instead of an error the orchestrator has to remember to
/// catch in the right place.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerResult {
    Ok(PlannerOutput),
    Fallback(String),
}

/// An external planning strategy (typically backed by an LLM).
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, input: &PlannerInput) -> PlannerResult;
}

/// Validate a `PlannerResult` into a `PlannerPlan`, falling back to the
/// heuristic when the planner errored or its output fails validation.
///
/// Invariants enforced here (§4.6): every `next_candidates` name must be
/// present in `input.ranked_candidates`; every query must be non-empty.
pub fn resolve_plan(result: PlannerResult, input: &PlannerInput) -> PlannerPlan {
    match result {
        PlannerResult::Fallback(reason) => heuristic_plan(input, reason),
        PlannerResult::Ok(output) => {
            if validate(&output, input) {
                PlannerPlan {
                    next_candidates: output.next_candidates,
                    search_queries: output.search_queries,
                    narration: output.narration,
                    stop: output.stop,
                    reason: output.reason,
                }
            } else {
                heuristic_plan(input, "planner output failed validation".to_string())
            }
        }
    }
}

fn validate(output: &PlannerOutput, input: &PlannerInput) -> bool {
    if output.next_candidates.is_empty() && !output.stop {
        return false;
    }
    let known: HashSet<&str> = input
        .ranked_candidates
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    if !output.next_candidates.iter().all(|c| known.contains(c.as_str())) {
        return false;
    }
    output.search_queries.iter().all(|q| !q.trim().is_empty())
}

/// Pick the single highest-confidence unfailed candidate; query the target
/// directly against it; stop iff no candidates remain (§4.6).
fn heuristic_plan(input: &PlannerInput, reason: String) -> PlannerPlan {
    match input.ranked_candidates.first() {
        Some(best) => PlannerPlan {
            next_candidates: vec![best.name.clone()],
            search_queries: vec![format!("{} {}", best.name, input.target.display_name)],
            narration: format!("falling back to heuristic: pursuing {}", best.name),
            stop: false,
            reason,
        },
        None => PlannerPlan {
            next_candidates: vec![],
            search_queries: vec![],
            narration: "no remaining candidates".to_string(),
            stop: true,
            reason,
        },
    }
}
