//! Orchestrator state machine (§4.7).
//!
//! Drives one `InvestigationRun` through direct_check, find_bridges,
//! verify_bridge, connect_target, and backtrack, enforcing budgets and
//! emitting the event stream. A run is spawned on the runtime at `start`
//! and driven to completion independently of its caller; callers observe
//! it through `subscribe` and `get`.

use crate::aggregator::Aggregator;
use crate::budget::Budget;
use crate::cache::QueryCache;
use crate::config::RunConfig;
use crate::confidence::{Path, VerifiedEdge};
use crate::error::{Error, Result};
use crate::events::{Event, EventLog, EventType};
use crate::graph::{Frontier, FrontierNode, Graph, Visited};
use crate::person::Person;
use crate::planner::{resolve_plan, Planner, PlannerInput, PlannerResult};
use crate::providers::{FaceRecognizer, ImageFetcher, SceneFilter, SearchProvider};
use crate::query;
use crate::verifier::{discover_candidates, verify_pair, ImageEvent, VerifyOptions};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub type RunId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// Point-in-time view of a run, returned by `Orchestrator::get`.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    pub status: RunStatus,
    pub path: Option<Path>,
    pub event_count: usize,
}

struct RunState {
    status: RunStatus,
    event_log: EventLog,
    path: Option<Path>,
}

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Walk `came_from` pointers from `node` back to the root, returning the
/// chain of Persons from source to `node` inclusive, in traversal order.
fn build_chain(came_from: &HashMap<String, FrontierNode>, node: &FrontierNode) -> Vec<Person> {
    let mut chain = vec![node.person.clone()];
    let mut cursor = node.came_from.clone();
    while let Some(key) = cursor {
        let parent = &came_from[&key];
        chain.push(parent.person.clone());
        cursor = parent.came_from.clone();
    }
    chain.reverse();
    chain
}

/// Look up the VerifiedEdge connecting each consecutive pair in `people`.
fn edges_between(graph: &Graph, people: &[Person]) -> Result<Vec<VerifiedEdge>> {
    let mut edges = Vec::with_capacity(people.len().saturating_sub(1));
    for pair in people.windows(2) {
        let edge = graph
            .edges_of(&pair[0])
            .iter()
            .find(|e| e.connects(&pair[0], &pair[1]))
            .cloned()
            .ok_or_else(|| Error::Internal("missing edge while assembling path".to_string()))?;
        edges.push(edge);
    }
    Ok(edges)
}

/// Drives investigation runs. Cheap to clone — all shared state lives
/// behind `Arc`.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    search: Arc<dyn SearchProvider>,
    scene_filter: Arc<dyn SceneFilter>,
    recognizer: Arc<dyn FaceRecognizer>,
    planner: Option<Arc<dyn Planner>>,
    fetcher: ImageFetcher,
    config: RunConfig,
    runs: Mutex<HashMap<RunId, Arc<Mutex<RunState>>>>,
    broadcasters: Mutex<HashMap<RunId, broadcast::Sender<Event>>>,
    cancel_senders: Mutex<HashMap<RunId, watch::Sender<bool>>>,
}

impl Orchestrator {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        scene_filter: Arc<dyn SceneFilter>,
        recognizer: Arc<dyn FaceRecognizer>,
        planner: Option<Arc<dyn Planner>>,
        config: RunConfig,
    ) -> Self {
        let fetcher = ImageFetcher::new(config.fetch_timeout_ms, config.max_image_bytes);
        Self {
            inner: Arc::new(Inner {
                search,
                scene_filter,
                recognizer,
                planner,
                fetcher,
                config,
                runs: Mutex::new(HashMap::new()),
                broadcasters: Mutex::new(HashMap::new()),
                cancel_senders: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Validate inputs, spawn the run, and return its id immediately.
    pub async fn start(&self, a: Person, b: Person) -> Result<RunId> {
        if a.key.is_empty() {
            return Err(Error::Input("source name normalizes to empty".to_string()));
        }
        if b.key.is_empty() {
            return Err(Error::Input("target name normalizes to empty".to_string()));
        }
        if a == b {
            return Err(Error::Input("source and target must be different people".to_string()));
        }

        let run_id = Uuid::new_v4();
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let state = Arc::new(Mutex::new(RunState {
            status: RunStatus::Running,
            event_log: EventLog::new(),
            path: None,
        }));

        self.inner.runs.lock().await.insert(run_id, Arc::clone(&state));
        self.inner.broadcasters.lock().await.insert(run_id, sender);
        self.inner.cancel_senders.lock().await.insert(run_id, cancel_tx);

        let orchestrator = self.clone();
        tokio::spawn(async move {
            orchestrator.drive(run_id, a, b, state, cancel_rx).await;
        });

        Ok(run_id)
    }

    /// Signal cancellation to a running investigation. No-op if the run is
    /// already finished or unknown.
    pub async fn cancel(&self, run_id: RunId) {
        if let Some(sender) = self.inner.cancel_senders.lock().await.get(&run_id) {
            let _ = sender.send(true);
        }
    }

    pub async fn subscribe(&self, run_id: RunId) -> Option<broadcast::Receiver<Event>> {
        self.inner
            .broadcasters
            .lock()
            .await
            .get(&run_id)
            .map(|s| s.subscribe())
    }

    pub async fn get(&self, run_id: RunId) -> Option<RunSnapshot> {
        let state = self.inner.runs.lock().await.get(&run_id).cloned()?;
        let state = state.lock().await;
        Some(RunSnapshot {
            status: state.status,
            path: state.path.clone(),
            event_count: state.event_log.len(),
        })
    }

    async fn emit(&self, state: &Arc<Mutex<RunState>>, run_id: &RunId, event_type: EventType, message: impl Into<String>) {
        let mut s = state.lock().await;
        s.event_log.push(event_type, message);
        self.broadcast_last(&mut s, run_id).await;
    }

    async fn emit_with_data(
        &self,
        state: &Arc<Mutex<RunState>>,
        run_id: &RunId,
        event_type: EventType,
        message: impl Into<String>,
        data: HashMap<String, Value>,
    ) {
        let mut s = state.lock().await;
        s.event_log.push_with_data(event_type, message, data);
        self.broadcast_last(&mut s, run_id).await;
    }

    /// Emit an `evidence` event for a just-committed `VerifiedEdge` (§4.7).
    /// Must be called before any `path_update` the same edge commit triggers.
    async fn emit_evidence(&self, state: &Arc<Mutex<RunState>>, run_id: &RunId, edge: &VerifiedEdge) {
        let mut data = HashMap::new();
        data.insert("a".to_string(), Value::from(edge.a.display_name.clone()));
        data.insert("b".to_string(), Value::from(edge.b.display_name.clone()));
        data.insert("confidence".to_string(), Value::from(edge.confidence()));
        let message = format!("evidence linking {} and {}", edge.a.display_name, edge.b.display_name);
        self.emit_with_data(state, run_id, EventType::Evidence, message, data).await;
    }

    /// Emit a `path_update` for a chain that just changed because a new
    /// edge was committed — always follows the `evidence` event for that edge.
    async fn emit_path_update(&self, state: &Arc<Mutex<RunState>>, run_id: &RunId, path: &Path) {
        let mut data = HashMap::new();
        data.insert("hops".to_string(), Value::from(path.len()));
        data.insert("confidence".to_string(), Value::from(path.confidence()));
        let message = format!("provisional chain now spans {} hops", path.len());
        self.emit_with_data(state, run_id, EventType::PathUpdate, message, data).await;
    }

    /// Surface per-image outcomes from a verifier batch as `image_result`
    /// events, in the issuance order the verifier produced them.
    async fn emit_image_events(&self, state: &Arc<Mutex<RunState>>, run_id: &RunId, events: Vec<ImageEvent>) {
        for event in events {
            let mut data = HashMap::new();
            data.insert("image_url".to_string(), Value::from(event.image_url.clone()));
            data.insert("status".to_string(), Value::from(event.status));
            if let Some(detail) = &event.detail {
                data.insert("detail".to_string(), Value::from(detail.clone()));
            }
            let message = format!("image result: {}", event.status);
            self.emit_with_data(state, run_id, EventType::ImageResult, message, data).await;
        }
    }

    #[instrument(skip(self, state, cancel_rx), fields(run_id = %run_id))]
    async fn drive(
        &self,
        run_id: RunId,
        a: Person,
        b: Person,
        state: Arc<Mutex<RunState>>,
        mut cancel_rx: watch::Receiver<bool>,
    ) {
        info!(source = %a.display_name, target = %b.display_name, "starting investigation run");

        let options = VerifyOptions {
            confidence_threshold: self.inner.config.confidence_threshold,
            images_per_query: self.inner.config.images_per_query,
            concurrency: self.inner.config.verify_concurrency,
            retry: self.inner.config.retry,
        };

        let mut budget = Budget::new(
            self.inner.config.max_hops,
            self.inner.config.max_images_searched,
            self.inner.config.max_images_recognized,
            self.inner.config.max_planner_calls,
        );
        let mut cache = QueryCache::new();
        let mut graph = Graph::new();
        let mut frontier = Frontier::new();
        let mut visited = Visited::new();
        let mut came_from: HashMap<String, FrontierNode> = HashMap::new();
        let mut failed_candidates: HashSet<String> = HashSet::new();
        let mut aggregators: HashMap<String, Aggregator> = HashMap::new();

        if *cancel_rx.borrow() {
            self.finish_cancelled(&state, &run_id).await;
            return;
        }

        // direct_check
        self.emit(&state, &run_id, EventType::StepStart, "checking for a direct connection").await;
        let direct_query = query::direct(&a.display_name, &b.display_name);
        let mut direct_image_events = Vec::new();
        match verify_pair(
            &a,
            &b,
            &direct_query,
            self.inner.search.as_ref(),
            self.inner.scene_filter.as_ref(),
            self.inner.recognizer.as_ref(),
            &self.inner.fetcher,
            &mut budget,
            &mut cache,
            &options,
            &mut direct_image_events,
        )
        .await
        {
            Ok(outcome) => {
                self.emit_image_events(&state, &run_id, direct_image_events).await;
                if let Some(edge) = outcome.edge {
                    self.emit_evidence(&state, &run_id, &edge).await;
                    graph.add_edge(edge.clone());
                    let path = Path::new(vec![a.clone(), b.clone()], vec![edge]);
                    self.emit_path_update(&state, &run_id, &path).await;
                    self.emit(&state, &run_id, EventType::StepComplete, "direct connection found").await;
                    self.finish_success(&state, &run_id, path).await;
                    return;
                }
                self.emit(&state, &run_id, EventType::StepComplete, "no direct connection").await;
            }
            Err(e) => {
                self.finish_error(&state, &run_id, &e.to_string()).await;
                return;
            }
        }

        frontier.push(a.clone(), 0, f32::MAX, None);

        loop {
            if *cancel_rx.borrow() {
                self.finish_cancelled(&state, &run_id).await;
                return;
            }
            if let Some(resource) = budget.is_exhausted() {
                self.emit(&state, &run_id, EventType::NoPath, format!("budget exhausted: {resource}")).await;
                self.finish_failed(&state, &run_id).await;
                return;
            }

            let Some(node) = frontier.pop() else {
                self.emit(&state, &run_id, EventType::NoPath, "no remaining candidates").await;
                self.finish_failed(&state, &run_id).await;
                return;
            };

            if visited.contains(&node.person) {
                continue;
            }
            visited.insert(&node.person);
            came_from.insert(node.person.key.clone(), node.clone());

            self.emit(
                &state,
                &run_id,
                EventType::StepStart,
                format!("expanding from {}", node.person.display_name),
            )
            .await;

            let at_ceiling = node.depth + 1 >= budget.max_hops;

            if !at_ceiling {
                let chain = build_chain(&came_from, &node);
                let result = self
                    .expand_segment(
                        &state,
                        &run_id,
                        &a,
                        &b,
                        &node,
                        &chain,
                        &mut budget,
                        &mut cache,
                        &mut graph,
                        &mut frontier,
                        &mut failed_candidates,
                        &mut aggregators,
                        &options,
                    )
                    .await;
                match result {
                    Ok(Some(path)) => {
                        self.emit(&state, &run_id, EventType::StepComplete, "bridge connected to target").await;
                        self.finish_success(&state, &run_id, path).await;
                        return;
                    }
                    Ok(None) => {
                        self.emit(&state, &run_id, EventType::Backtrack, "segment exhausted, backtracking").await;
                        continue;
                    }
                    Err(e) => {
                        self.finish_error(&state, &run_id, &e.to_string()).await;
                        return;
                    }
                }
            }

            // At the hop ceiling: only attempt connect_target directly.
            match self
                .try_connect_target(&state, &run_id, &node.person, &b, &mut budget, &mut cache, &options)
                .await
            {
                Ok(Some(edge)) => {
                    self.emit_evidence(&state, &run_id, &edge).await;
                    graph.add_edge(edge);
                    let chain = build_chain(&came_from, &node);
                    let mut people = chain;
                    people.push(b.clone());
                    match edges_between(&graph, &people) {
                        Ok(edges) => {
                            let path = Path::new(people, edges);
                            self.emit_path_update(&state, &run_id, &path).await;
                            self.emit(&state, &run_id, EventType::StepComplete, "reached hop ceiling, connected to target").await;
                            self.finish_success(&state, &run_id, path).await;
                        }
                        Err(e) => self.finish_error(&state, &run_id, &e.to_string()).await,
                    }
                    return;
                }
                Ok(None) => {
                    self.emit(&state, &run_id, EventType::Backtrack, "hop ceiling reached, no connection").await;
                    continue;
                }
                Err(e) => {
                    self.finish_error(&state, &run_id, &e.to_string()).await;
                    return;
                }
            }
        }
    }

    /// One find_bridges -> verify_bridge -> connect_target pass over a
    /// single frontier node. Returns the completed path on success, `None`
    /// if this segment yields nothing further, or a fatal error.
    #[allow(clippy::too_many_arguments)]
    async fn expand_segment(
        &self,
        state: &Arc<Mutex<RunState>>,
        run_id: &RunId,
        a: &Person,
        b: &Person,
        node: &FrontierNode,
        chain: &[Person],
        budget: &mut Budget,
        cache: &mut QueryCache,
        graph: &mut Graph,
        frontier: &mut Frontier,
        failed_candidates: &mut HashSet<String>,
        aggregators: &mut HashMap<String, Aggregator>,
        options: &VerifyOptions,
    ) -> Result<Option<Path>> {
        let discovery_queries = query::discovery(&node.person.display_name);
        let mut discovery_image_events = Vec::new();
        let discovered = discover_candidates(
            &node.person,
            &discovery_queries,
            self.inner.search.as_ref(),
            self.inner.scene_filter.as_ref(),
            self.inner.recognizer.as_ref(),
            &self.inner.fetcher,
            budget,
            options,
            &mut discovery_image_events,
        )
        .await?;
        self.emit_image_events(state, run_id, discovery_image_events).await;

        let aggregator = aggregators.entry(node.person.key.clone()).or_default();
        aggregator.merge(&discovered.co_appearances, &discovered.display_names);
        let ranked = aggregator.ranked(a, b, chain, failed_candidates);

        if ranked.is_empty() {
            return Ok(None);
        }

        let plan_input = PlannerInput {
            source: a.clone(),
            target: b.clone(),
            frontier_person: node.person.clone(),
            hops_used: node.depth,
            hop_limit: budget.max_hops,
            confidence_threshold: options.confidence_threshold,
            images_searched_remaining: budget.max_images_searched - budget.images_searched(),
            images_recognized_remaining: budget.max_images_recognized - budget.images_recognized(),
            planner_calls_remaining: budget.max_planner_calls - budget.planner_calls(),
            verified_edges: graph.edges_of(&node.person).to_vec(),
            failed_candidates: failed_candidates.clone(),
            ranked_candidates: ranked,
        };

        let plan_result = match &self.inner.planner {
            Some(planner) if budget.can_call_planner() => {
                budget
                    .record_planner_call()
                    .expect("guarded by can_call_planner above");
                planner.plan(&plan_input).await
            }
            Some(_) => PlannerResult::Fallback("planner budget exhausted".to_string()),
            None => PlannerResult::Fallback("no planner configured".to_string()),
        };
        let plan = resolve_plan(plan_result, &plan_input);
        debug!(narration = %plan.narration, "planner decision");

        if plan.stop {
            return Ok(None);
        }

        for candidate_name in &plan.next_candidates {
            let candidate = Person::new(candidate_name.as_str());
            if chain.iter().any(|p| *p == candidate) {
                continue;
            }

            let bridge_queries = query::bridge(&node.person.display_name, candidate_name);
            let mut bridge_edge = None;
            for q in &bridge_queries {
                let mut image_events = Vec::new();
                let outcome = verify_pair(
                    &node.person,
                    &candidate,
                    q,
                    self.inner.search.as_ref(),
                    self.inner.scene_filter.as_ref(),
                    self.inner.recognizer.as_ref(),
                    &self.inner.fetcher,
                    budget,
                    cache,
                    options,
                    &mut image_events,
                )
                .await?;
                self.emit_image_events(state, run_id, image_events).await;
                if let Some(edge) = outcome.edge {
                    bridge_edge = Some(edge);
                    break;
                }
            }

            let Some(edge) = bridge_edge else {
                failed_candidates.insert(candidate.key.clone());
                continue;
            };

            self.emit_evidence(state, run_id, &edge).await;
            let edge_confidence = edge.confidence();
            graph.add_edge(edge);
            let new_depth = node.depth + 1;
            let new_chain_confidence = node.chain_confidence.min(edge_confidence);

            let mut provisional_people = chain.to_vec();
            provisional_people.push(candidate.clone());
            let provisional_edges = edges_between(graph, &provisional_people)?;
            self.emit_path_update(state, run_id, &Path::new(provisional_people, provisional_edges)).await;

            if let Some(final_edge) = self
                .try_connect_target(state, run_id, &candidate, b, budget, cache, options)
                .await?
            {
                self.emit_evidence(state, run_id, &final_edge).await;
                graph.add_edge(final_edge);
                let mut people = chain.to_vec();
                people.push(candidate);
                people.push(b.clone());
                let edges = edges_between(graph, &people)?;
                let path = Path::new(people, edges);
                self.emit_path_update(state, run_id, &path).await;
                return Ok(Some(path));
            }

            frontier.push(candidate, new_depth, new_chain_confidence, Some(node.person.key.clone()));
        }

        Ok(None)
    }

    async fn try_connect_target(
        &self,
        state: &Arc<Mutex<RunState>>,
        run_id: &RunId,
        candidate: &Person,
        b: &Person,
        budget: &mut Budget,
        cache: &mut QueryCache,
        options: &VerifyOptions,
    ) -> Result<Option<VerifiedEdge>> {
        let queries = query::verification(&candidate.display_name, &b.display_name);
        for q in &queries {
            let mut image_events = Vec::new();
            let outcome = verify_pair(
                candidate,
                b,
                q,
                self.inner.search.as_ref(),
                self.inner.scene_filter.as_ref(),
                self.inner.recognizer.as_ref(),
                &self.inner.fetcher,
                budget,
                cache,
                options,
                &mut image_events,
            )
            .await?;
            self.emit_image_events(state, run_id, image_events).await;
            if let Some(edge) = outcome.edge {
                return Ok(Some(edge));
            }
        }
        Ok(None)
    }

    async fn finish_success(&self, state: &Arc<Mutex<RunState>>, run_id: &RunId, path: Path) {
        let confidence = path.confidence();
        let mut s = state.lock().await;
        s.event_log.push(EventType::Final, format!("path found with confidence {confidence}"));
        s.path = Some(path);
        s.status = RunStatus::Completed;
        self.broadcast_last(&mut s, run_id).await;
        info!(run_id = %run_id, "run completed");
    }

    async fn finish_failed(&self, state: &Arc<Mutex<RunState>>, run_id: &RunId) {
        let mut s = state.lock().await;
        if !s.event_log.is_terminated() {
            s.event_log.push(EventType::NoPath, "investigation exhausted");
        }
        s.status = RunStatus::Failed;
        self.broadcast_last(&mut s, run_id).await;
        warn!(run_id = %run_id, "run failed: exhausted");
    }

    async fn finish_error(&self, state: &Arc<Mutex<RunState>>, run_id: &RunId, message: &str) {
        let mut s = state.lock().await;
        if !s.event_log.is_terminated() {
            s.event_log.push(EventType::Error, message.to_string());
        }
        s.status = RunStatus::Failed;
        self.broadcast_last(&mut s, run_id).await;
        warn!(run_id = %run_id, error = %message, "run failed: error");
    }

    async fn finish_cancelled(&self, state: &Arc<Mutex<RunState>>, run_id: &RunId) {
        let mut s = state.lock().await;
        if !s.event_log.is_terminated() {
            s.event_log.push(EventType::Error, "cancelled".to_string());
        }
        s.status = RunStatus::Failed;
        self.broadcast_last(&mut s, run_id).await;
        info!(run_id = %run_id, "run cancelled");
    }

    async fn broadcast_last(&self, state: &mut MutexGuard<'_, RunState>, run_id: &RunId) {
        let sender = self.inner.broadcasters.lock().await.get(run_id).cloned();
        if let Some(sender) = sender {
            if let Some(event) = state.event_log.events().last() {
                let _ = sender.send(event.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::{DetectedCelebrity, ImageCandidate};
    use crate::providers::SceneClassification;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tokio::time::{sleep, Duration};

    struct StaticSearch;

    #[async_trait]
    impl SearchProvider for StaticSearch {
        async fn search_images(&self, _query: &str) -> Result<Vec<ImageCandidate>> {
            Ok(vec![])
        }
    }

    struct RealScene;

    #[async_trait]
    impl SceneFilter for RealScene {
        async fn classify(&self, _bytes: &[u8]) -> Result<SceneClassification> {
            Ok(SceneClassification::real_scene())
        }
    }

    struct NoOneRecognized;

    #[async_trait]
    impl FaceRecognizer for NoOneRecognized {
        async fn recognize(&self, _bytes: &[u8]) -> Result<Vec<DetectedCelebrity>> {
            Ok(vec![])
        }
    }

    fn test_orchestrator() -> Orchestrator {
        Orchestrator::new(
            Arc::new(StaticSearch),
            Arc::new(RealScene),
            Arc::new(NoOneRecognized),
            None,
            RunConfig {
                max_hops: 2,
                ..RunConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn rejects_identical_source_and_target() {
        let orchestrator = test_orchestrator();
        let result = orchestrator.start(Person::new("Same Person"), Person::new("Same Person")).await;
        assert!(matches!(result, Err(Error::Input(_))));
    }

    #[tokio::test]
    async fn empty_search_results_lead_to_no_path() {
        let orchestrator = test_orchestrator();
        let run_id = orchestrator
            .start(Person::new("Elon Musk"), Person::new("Jimmy Fallon"))
            .await
            .unwrap();

        for _ in 0..50 {
            if let Some(snapshot) = orchestrator.get(run_id).await {
                if snapshot.status != RunStatus::Running {
                    assert_eq!(snapshot.status, RunStatus::Failed);
                    assert!(snapshot.path.is_none());
                    return;
                }
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("run did not terminate in time");
    }

    #[test]
    fn build_chain_walks_came_from_to_root() {
        let a = Person::new("A");
        let b = Person::new("B");
        let c = Person::new("C");
        let mut came_from = HashMap::new();
        came_from.insert(
            a.key.clone(),
            FrontierNode {
                person: a.clone(),
                depth: 0,
                chain_confidence: f32::MAX,
                came_from: None,
                sequence: 0,
            },
        );
        came_from.insert(
            b.key.clone(),
            FrontierNode {
                person: b.clone(),
                depth: 1,
                chain_confidence: 90.0,
                came_from: Some(a.key.clone()),
                sequence: 1,
            },
        );
        let c_node = FrontierNode {
            person: c.clone(),
            depth: 2,
            chain_confidence: 85.0,
            came_from: Some(b.key.clone()),
            sequence: 2,
        };
        let chain = build_chain(&came_from, &c_node);
        assert_eq!(chain, vec![a, b, c]);
    }
}
