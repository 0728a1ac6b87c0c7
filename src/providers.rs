//! External collaborator contracts (§6).
//!
//! These traits are the only way the core talks to the outside world. Their
//! concrete implementations (a real image search API, a hosted recognizer,
//! a vision classifier, an LLM planner) are out of scope for this crate —
//! callers provide them. The one concrete I/O path this crate owns is
//! fetching raw image bytes for a candidate URL, since enforcing
//! size/timeout/content-type limits on that fetch is itself specified
//! behavior (§4.4 step 2a).

use crate::confidence::{DetectedCelebrity, ImageCandidate};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

/// `searchImages(query) -> [ImageCandidate]` (§6).
///
/// May fail with a provider error (propagated) or return an empty vec
/// (treated as zero candidates, not an error).
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search_images(&self, query: &str) -> Result<Vec<ImageCandidate>>;
}

/// Result of classifying whether an image is a real co-presence scene or a
/// collage/montage/composite (§6).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneClassification {
    pub is_real_scene: bool,
    pub reason: Option<String>,
}

impl SceneClassification {
    pub fn real_scene() -> Self {
        Self {
            is_real_scene: true,
            reason: None,
        }
    }

    pub fn collage(reason: impl Into<String>) -> Self {
        Self {
            is_real_scene: false,
            reason: Some(reason.into()),
        }
    }
}

/// `classify(bytes) -> { isRealScene, reason? }` (§6).
#[async_trait]
pub trait SceneFilter: Send + Sync {
    async fn classify(&self, bytes: &[u8]) -> Result<SceneClassification>;
}

/// `recognize(bytes) -> [DetectedCelebrity]` (§6).
///
/// Confidence is a percentage; callers must enforce the image size cap
/// before submission (this crate does so in the image fetch path).
#[async_trait]
pub trait FaceRecognizer: Send + Sync {
    async fn recognize(&self, bytes: &[u8]) -> Result<Vec<DetectedCelebrity>>;
}

/// A minimal set of content types the fetcher will accept as image bytes.
const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

fn build_http_client(timeout_ms: u64) -> reqwest::Client {
    let timeout = Duration::from_millis(timeout_ms);

    // Some sandboxed environments can panic during proxy auto-detection in
    // reqwest's default client builder. Fall back to no-proxy in that case.
    match catch_unwind(AssertUnwindSafe(|| {
        reqwest::Client::builder().timeout(timeout).build()
    })) {
        Ok(Ok(client)) => client,
        Ok(Err(_)) | Err(_) => reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client"),
    }
}

/// Fetches raw bytes for a candidate image URL, enforcing a timeout, a byte
/// cap, and an allow-list of content types (§4.4 step 2a).
pub struct ImageFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ImageFetcher {
    pub fn new(timeout_ms: u64, max_bytes: u64) -> Self {
        Self {
            client: build_http_client(timeout_ms),
            max_bytes,
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch_failed(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::fetch_failed(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        if !content_type.is_empty() && !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(Error::fetch_failed(format!(
                "unsupported content type: {content_type}"
            )));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(Error::fetch_failed(format!(
                    "image too large: {len} bytes exceeds cap of {}",
                    self.max_bytes
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::fetch_failed(format!("failed to read body: {e}")))?;

        if bytes.len() as u64 > self.max_bytes {
            return Err(Error::fetch_failed(format!(
                "image too large: {} bytes exceeds cap of {}",
                bytes.len(),
                self.max_bytes
            )));
        }

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_classification_constructors() {
        let real = SceneClassification::real_scene();
        assert!(real.is_real_scene);
        assert!(real.reason.is_none());

        let collage = SceneClassification::collage("stitched composite detected");
        assert!(!collage.is_real_scene);
        assert_eq!(collage.reason.as_deref(), Some("stitched composite detected"));
    }

    #[test]
    fn image_fetcher_can_be_constructed() {
        let _fetcher = ImageFetcher::new(10_000, 5 * 1024 * 1024);
    }
}
