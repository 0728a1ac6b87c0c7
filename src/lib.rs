//! copresence-core: a bounded best-first graph-expansion engine for finding
//! visually verified co-appearance chains between two public figures.
//!
//! An `InvestigationRun` starts from a source and target Person, checks for
//! a direct co-appearance, then expands a search graph outward — discovering
//! candidate third parties, verifying each candidate bridge against visual
//! evidence, and attempting to connect each bridge to the target — until a
//! path is found or the run's budgets are exhausted. Callers supply the
//! search, scene-classification, face-recognition, and (optionally) planning
//! backends through the traits in [`providers`] and [`planner`]; this crate
//! owns only the graph search, confidence calculus, budgeting, caching, and
//! event-stream machinery around them.
//!
//! The [`Orchestrator`] is the entry point: `start` spawns a run and returns
//! its id immediately, `subscribe` streams its events, and `get` reads a
//! point-in-time snapshot.

pub mod aggregator;
pub mod budget;
pub mod cache;
pub mod confidence;
pub mod config;
pub mod error;
pub mod events;
pub mod graph;
pub mod orchestrator;
pub mod person;
pub mod planner;
pub mod providers;
pub mod query;
pub mod retry;
pub mod verifier;

pub use budget::{Budget, BudgetResource};
pub use config::{RunConfig, RunConfigBuilder};
pub use error::{Error, Result};
pub use events::{Event, EventLog, EventType, StepStatus};
pub use orchestrator::{Orchestrator, RunId, RunSnapshot, RunStatus};
pub use person::Person;
pub use planner::{Planner, PlannerInput, PlannerOutput, PlannerPlan, PlannerResult};
pub use providers::{FaceRecognizer, ImageFetcher, SceneClassification, SceneFilter, SearchProvider};
