//! Evidence verifier (§4.4).
//!
//! `verify_pair(A, B, query)` fetches candidate images for a query, filters
//! out collages, recognizes faces, and turns the results into a
//! `VerifiedEdge` plus a co-appearance accumulator for everyone else seen
//! along the way. Images are processed with bounded parallelism, but the
//! per-image outcomes come back in issuance order — not completion order —
//! mirroring this codebase's existing order-preserving batch-execution
//! pattern for concurrent provider calls. Callers pass a `Vec<ImageEvent>` to
//! collect what happened to each image, in that same issuance order, so they
//! can surface it to their own event log without this module knowing
//! anything about events.

use crate::budget::Budget;
use crate::cache::{CoAppearanceTally, QueryCache, VerifierOutcome};
use crate::confidence::{EvidenceRecord, ImageAnalysis, VerifiedEdge};
use crate::error::{Error, Result};
use crate::person::{names_match, normalize_name, Person};
use crate::providers::{FaceRecognizer, ImageFetcher, SceneFilter, SearchProvider};
use crate::retry::{with_retry, RetryConfig};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

/// Tunables for a single `verify_pair` call, distinct from run-wide config
/// so this module stays testable without a full `RunConfig`.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub confidence_threshold: f32,
    pub images_per_query: usize,
    pub concurrency: usize,
    pub retry: RetryConfig,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 80.0,
            images_per_query: 5,
            concurrency: 2,
            retry: RetryConfig::default(),
        }
    }
}

/// What happened to a single candidate image, in issuance order.
#[derive(Debug, Clone)]
pub enum ImageOutcome {
    /// A real scene, submitted to the recognizer; may or may not turn out
    /// to be valid evidence once `is_valid_evidence` runs.
    Analyzed(ImageAnalysis),
    RejectedCollage { reason: Option<String> },
    FetchFailed { reason: String },
    SearchBudgetExhausted,
    RecognizeBudgetExhausted,
}

/// A per-image outcome surfaced to the caller, in issuance order, so it can
/// be turned into an `image_result` event without this module depending on
/// the orchestrator's event types.
#[derive(Debug, Clone)]
pub struct ImageEvent {
    pub image_url: String,
    pub status: &'static str,
    pub detail: Option<String>,
}

impl ImageEvent {
    fn from_outcome(image_url: &str, outcome: &ImageOutcome) -> Self {
        let (status, detail) = match outcome {
            ImageOutcome::Analyzed(_) => ("analyzed", None),
            ImageOutcome::RejectedCollage { reason } => ("rejected-collage", reason.clone()),
            ImageOutcome::FetchFailed { reason } => ("error", Some(reason.clone())),
            ImageOutcome::SearchBudgetExhausted => ("search-budget-exhausted", None),
            ImageOutcome::RecognizeBudgetExhausted => ("recognize-budget-exhausted", None),
        };
        Self {
            image_url: image_url.to_string(),
            status,
            detail,
        }
    }
}

async fn process_image_inner(
    fetcher: &ImageFetcher,
    scene_filter: &dyn SceneFilter,
    recognizer: &dyn FaceRecognizer,
    budget: &Mutex<&mut Budget>,
    retry: &RetryConfig,
    candidate: crate::confidence::ImageCandidate,
) -> ImageOutcome {
    {
        let mut b = budget.lock().await;
        if b.record_image_searched().is_err() {
            return ImageOutcome::SearchBudgetExhausted;
        }
    }

    let bytes = match fetcher.fetch(&candidate.image_url).await {
        Ok(bytes) => bytes,
        Err(e) => return ImageOutcome::FetchFailed { reason: e.to_string() },
    };

    let classification = match scene_filter.classify(&bytes).await {
        Ok(c) => c,
        Err(e) => return ImageOutcome::FetchFailed { reason: e.to_string() },
    };
    if !classification.is_real_scene {
        return ImageOutcome::RejectedCollage {
            reason: classification.reason,
        };
    }

    {
        let mut b = budget.lock().await;
        if b.record_image_recognized().is_err() {
            return ImageOutcome::RecognizeBudgetExhausted;
        }
    }

    let detections = match with_retry(*retry, || async {
        recognizer
            .recognize(&bytes)
            .await
            .map_err(|e| Error::provider("recognizer", e.to_string(), e.is_transient()))
    })
    .await
    {
        Ok(d) => d,
        Err(e) => return ImageOutcome::FetchFailed { reason: e.to_string() },
    };

    ImageOutcome::Analyzed(ImageAnalysis::new(candidate, detections))
}

/// Process one candidate image, pairing its outcome with the URL it came
/// from so the caller can report on it without re-threading the candidate.
async fn process_image(
    fetcher: &ImageFetcher,
    scene_filter: &dyn SceneFilter,
    recognizer: &dyn FaceRecognizer,
    budget: &Mutex<&mut Budget>,
    retry: &RetryConfig,
    candidate: crate::confidence::ImageCandidate,
) -> (String, ImageOutcome) {
    let image_url = candidate.image_url.clone();
    let outcome = process_image_inner(fetcher, scene_filter, recognizer, budget, retry, candidate).await;
    (image_url, outcome)
}

/// Issue one query against the search provider and process up to
/// `options.images_per_query` resulting candidates with bounded
/// parallelism, returning each image's (url, outcome) in issuance order.
async fn run_image_batch(
    query: &str,
    search: &dyn SearchProvider,
    scene_filter: &dyn SceneFilter,
    recognizer: &dyn FaceRecognizer,
    fetcher: &ImageFetcher,
    budget: &mut Budget,
    options: &VerifyOptions,
) -> Result<Vec<(String, ImageOutcome)>> {
    let candidates = with_retry(options.retry, || async {
        search
            .search_images(query)
            .await
            .map_err(|e| Error::provider("search", e.to_string(), e.is_transient()))
    })
    .await?;

    let usable: Vec<_> = candidates
        .into_iter()
        .filter(|c| c.is_usable())
        .take(options.images_per_query)
        .collect();

    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let budget_lock = Mutex::new(budget);

    let tasks = usable.into_iter().map(|candidate| {
        let semaphore = Arc::clone(&semaphore);
        let budget_lock = &budget_lock;
        async move {
            let _permit = semaphore.acquire().await.expect("semaphore closed unexpectedly");
            process_image(
                fetcher,
                scene_filter,
                recognizer,
                budget_lock,
                &options.retry,
                candidate,
            )
            .await
        }
    });

    Ok(join_all(tasks).await)
}

fn record_co_appearances(
    analysis: &ImageAnalysis,
    exclude: &[&str],
    threshold: f32,
    co_appearances: &mut HashMap<String, CoAppearanceTally>,
    display_names: &mut HashMap<String, String>,
) {
    let excluded_keys: Vec<String> = exclude.iter().map(|n| normalize_name(n)).collect();
    for detection in &analysis.detections {
        let key = normalize_name(&detection.name);
        if excluded_keys.iter().any(|e| names_match(&key, e)) {
            continue;
        }
        if detection.confidence < threshold {
            continue;
        }
        display_names
            .entry(key.clone())
            .or_insert_with(|| detection.name.clone());
        co_appearances.entry(key).or_default().record(detection.confidence);
    }
}

/// Run `verify_pair(a, b, query)`. Consults the query cache first; on a
/// miss, issues a search and processes up to `options.images_per_query`
/// candidates with bounded parallelism. On a cache hit no images are
/// processed, so `image_events` is left untouched.
#[allow(clippy::too_many_arguments)]
pub async fn verify_pair(
    a: &Person,
    b: &Person,
    query: &str,
    search: &dyn SearchProvider,
    scene_filter: &dyn SceneFilter,
    recognizer: &dyn FaceRecognizer,
    fetcher: &ImageFetcher,
    budget: &mut Budget,
    cache: &mut QueryCache,
    options: &VerifyOptions,
    image_events: &mut Vec<ImageEvent>,
) -> Result<VerifierOutcome> {
    if let Some(cached) = cache.get(a, b, query) {
        return Ok(cached.clone());
    }

    let outcomes =
        run_image_batch(query, search, scene_filter, recognizer, fetcher, budget, options).await?;

    let mut evidence = Vec::new();
    let mut co_appearances: HashMap<String, CoAppearanceTally> = HashMap::new();
    let mut display_names: HashMap<String, String> = HashMap::new();

    for (image_url, outcome) in outcomes {
        image_events.push(ImageEvent::from_outcome(&image_url, &outcome));

        let analysis = match outcome {
            ImageOutcome::Analyzed(analysis) => analysis,
            ImageOutcome::RejectedCollage { .. }
            | ImageOutcome::FetchFailed { .. }
            | ImageOutcome::SearchBudgetExhausted
            | ImageOutcome::RecognizeBudgetExhausted => continue,
        };

        if let Some(record) =
            EvidenceRecord::from_analysis(analysis.clone(), &a.display_name, &b.display_name, options.confidence_threshold)
        {
            evidence.push(record);
        }

        record_co_appearances(
            &analysis,
            &[&a.display_name, &b.display_name],
            options.confidence_threshold,
            &mut co_appearances,
            &mut display_names,
        );
    }

    let edge = VerifiedEdge::new(a.clone(), b.clone(), evidence);
    let result = VerifierOutcome { edge, co_appearances };
    cache.insert(a, b, query, result.clone());
    Ok(result)
}

/// Co-appearance tallies discovered from a frontier Person, keyed by
/// normalized name, alongside the first display name seen for each key so
/// callers can surface candidates under their original casing.
#[derive(Debug, Default)]
pub struct DiscoveryResult {
    pub co_appearances: HashMap<String, CoAppearanceTally>,
    pub display_names: HashMap<String, String>,
}

/// Run discovery queries from a single frontier Person `f`, with no target
/// in mind yet. Every detected celebrity other than `f` feeds the returned
/// co-appearance tally — there is no EvidenceRecord to compute since there
/// is no second named target (§4.7 `find_bridges`).
#[allow(clippy::too_many_arguments)]
pub async fn discover_candidates(
    f: &Person,
    queries: &[String],
    search: &dyn SearchProvider,
    scene_filter: &dyn SceneFilter,
    recognizer: &dyn FaceRecognizer,
    fetcher: &ImageFetcher,
    budget: &mut Budget,
    options: &VerifyOptions,
    image_events: &mut Vec<ImageEvent>,
) -> Result<DiscoveryResult> {
    let mut co_appearances: HashMap<String, CoAppearanceTally> = HashMap::new();
    let mut display_names: HashMap<String, String> = HashMap::new();

    for query in queries {
        let outcomes =
            run_image_batch(query, search, scene_filter, recognizer, fetcher, budget, options).await?;
        for (image_url, outcome) in outcomes {
            image_events.push(ImageEvent::from_outcome(&image_url, &outcome));
            if let ImageOutcome::Analyzed(analysis) = outcome {
                record_co_appearances(
                    &analysis,
                    &[&f.display_name],
                    options.confidence_threshold,
                    &mut co_appearances,
                    &mut display_names,
                );
            }
        }
    }

    Ok(DiscoveryResult { co_appearances, display_names })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::{BoundingBox, DetectedCelebrity, ImageCandidate};
    use crate::providers::SceneClassification;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockSearch {
        candidates: Vec<ImageCandidate>,
    }

    #[async_trait]
    impl SearchProvider for MockSearch {
        async fn search_images(&self, _query: &str) -> Result<Vec<ImageCandidate>> {
            Ok(self.candidates.clone())
        }
    }

    struct AlwaysRealScene;

    #[async_trait]
    impl SceneFilter for AlwaysRealScene {
        async fn classify(&self, _bytes: &[u8]) -> Result<SceneClassification> {
            Ok(SceneClassification::real_scene())
        }
    }

    struct AlwaysCollage;

    #[async_trait]
    impl SceneFilter for AlwaysCollage {
        async fn classify(&self, _bytes: &[u8]) -> Result<SceneClassification> {
            Ok(SceneClassification::collage("stitched composite"))
        }
    }

    struct MockRecognizer {
        detections: Vec<DetectedCelebrity>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FaceRecognizer for MockRecognizer {
        async fn recognize(&self, _bytes: &[u8]) -> Result<Vec<DetectedCelebrity>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.detections.clone())
        }
    }

    fn bbox() -> BoundingBox {
        BoundingBox {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    fn candidate(i: usize) -> ImageCandidate {
        ImageCandidate {
            image_url: format!("https://example.test/{i}.jpg"),
            thumbnail_url: None,
            context_url: format!("https://example.test/{i}"),
            title: None,
        }
    }

    /// A real loopback HTTP server, since `ImageFetcher` performs a genuine
    /// `reqwest` GET and has no injectable seam to fake that out.
    fn spawn_image_server() -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local test server");
        let port = listener.local_addr().expect("local addr").port();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).unwrap_or(0);
                let body = b"evidence";
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.write_all(body);
            }
        });
        format!("http://127.0.0.1:{port}/image.jpg")
    }

    #[tokio::test]
    async fn direct_evidence_and_cache_hit_on_second_call() {
        let a = Person::new("Elon Musk");
        let b = Person::new("Jimmy Fallon");
        let image_url = spawn_image_server();
        let search = MockSearch {
            candidates: vec![ImageCandidate {
                image_url: image_url.clone(),
                thumbnail_url: None,
                context_url: format!("{image_url}/context"),
                title: None,
            }],
        };
        let scene_filter = AlwaysRealScene;
        let recognizer = MockRecognizer {
            detections: vec![
                DetectedCelebrity::new("Elon Musk", 95.0, bbox()),
                DetectedCelebrity::new("Jimmy Fallon", 90.0, bbox()),
            ],
            calls: AtomicUsize::new(0),
        };
        let fetcher = ImageFetcher::new(10_000, 5 * 1024 * 1024);
        let mut budget = Budget::default();
        let mut cache = QueryCache::new();
        let options = VerifyOptions::default();
        let mut image_events = Vec::new();

        let outcome = verify_pair(
            &a,
            &b,
            "elon musk jimmy fallon",
            &search,
            &scene_filter,
            &recognizer,
            &fetcher,
            &mut budget,
            &mut cache,
            &options,
            &mut image_events,
        )
        .await
        .unwrap();

        let edge = outcome.edge.expect("both names detected above threshold must yield an edge");
        assert_eq!(edge.confidence(), 90.0);
        assert!(cache.contains(&a, &b, "elon musk jimmy fallon"));
        assert_eq!(image_events.len(), 1);
        assert_eq!(image_events[0].status, "analyzed");

        let mut second_image_events = Vec::new();
        let cached = verify_pair(
            &a,
            &b,
            "elon musk jimmy fallon",
            &search,
            &scene_filter,
            &recognizer,
            &fetcher,
            &mut budget,
            &mut cache,
            &options,
            &mut second_image_events,
        )
        .await
        .unwrap();
        assert_eq!(cached.edge.unwrap().confidence(), 90.0);
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 1, "second call must hit the cache, not the recognizer");
        assert!(second_image_events.is_empty(), "a cache hit processes no images");
    }

    #[tokio::test]
    async fn collage_rejection_does_not_update_co_appearances() {
        let a = Person::new("A");
        let b = Person::new("B");
        let search = MockSearch {
            candidates: vec![candidate(0)],
        };
        let scene_filter = AlwaysCollage;
        let recognizer = MockRecognizer {
            detections: vec![DetectedCelebrity::new("C", 99.0, bbox())],
            calls: AtomicUsize::new(0),
        };
        let fetcher = ImageFetcher::new(10_000, 5 * 1024 * 1024);
        let mut budget = Budget::default();
        let mut cache = QueryCache::new();
        let options = VerifyOptions::default();
        let mut image_events = Vec::new();

        let outcome = verify_pair(
            &a,
            &b,
            "a b",
            &search,
            &scene_filter,
            &recognizer,
            &fetcher,
            &mut budget,
            &mut cache,
            &options,
            &mut image_events,
        )
        .await
        .unwrap();

        assert!(outcome.co_appearances.is_empty());
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(image_events.len(), 1);
        assert_eq!(image_events[0].status, "rejected-collage");
        assert_eq!(image_events[0].detail.as_deref(), Some("stitched composite"));
    }

    #[tokio::test]
    async fn empty_search_results_yield_no_edge() {
        let a = Person::new("A");
        let b = Person::new("B");
        let search = MockSearch { candidates: vec![] };
        let scene_filter = AlwaysRealScene;
        let recognizer = MockRecognizer {
            detections: vec![],
            calls: AtomicUsize::new(0),
        };
        let fetcher = ImageFetcher::new(10_000, 5 * 1024 * 1024);
        let mut budget = Budget::default();
        let mut cache = QueryCache::new();
        let options = VerifyOptions::default();
        let mut image_events = Vec::new();

        let outcome = verify_pair(
            &a,
            &b,
            "a b",
            &search,
            &scene_filter,
            &recognizer,
            &fetcher,
            &mut budget,
            &mut cache,
            &options,
            &mut image_events,
        )
        .await
        .unwrap();
        assert!(outcome.edge.is_none());
        assert!(image_events.is_empty());
    }

    #[tokio::test]
    async fn discover_candidates_runs_every_query_without_erroring() {
        let f = Person::new("Elon Musk");
        let search = MockSearch {
            candidates: vec![candidate(0), candidate(1)],
        };
        let scene_filter = AlwaysRealScene;
        let recognizer = MockRecognizer {
            detections: vec![],
            calls: AtomicUsize::new(0),
        };
        let fetcher = ImageFetcher::new(10_000, 5 * 1024 * 1024);
        let mut budget = Budget::default();
        let options = VerifyOptions::default();
        let queries = vec!["elon musk event".to_string(), "elon musk with".to_string()];
        let mut image_events = Vec::new();

        let result = discover_candidates(
            &f,
            &queries,
            &search,
            &scene_filter,
            &recognizer,
            &fetcher,
            &mut budget,
            &options,
            &mut image_events,
        )
        .await
        .unwrap();
        assert!(result.co_appearances.is_empty());
        assert_eq!(image_events.len(), 4);
    }
}
