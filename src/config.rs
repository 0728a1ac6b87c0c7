//! Run configuration (§4.10, §6).
//!
//! Every tunable a caller can set for an `InvestigationRun`, with the
//! documented defaults, built through a small builder in the style of this
//! codebase's existing client/orchestrator configuration types.

use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};

/// Typed, documented defaults for every run-level tunable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Face-detection cutoff (0..=100).
    pub confidence_threshold: f32,
    /// Hard ceiling on path length.
    pub max_hops: u32,
    /// Images requested per query.
    pub images_per_query: usize,
    pub max_images_searched: u32,
    pub max_images_recognized: u32,
    pub max_planner_calls: u32,
    pub fetch_timeout_ms: u64,
    pub max_image_bytes: u64,
    /// Bounded parallelism P for image processing within one `verify_pair` call.
    pub verify_concurrency: usize,
    pub retry: RetryConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 80.0,
            max_hops: 6,
            images_per_query: 5,
            max_images_searched: 200,
            max_images_recognized: 200,
            max_planner_calls: 50,
            fetch_timeout_ms: 10_000,
            max_image_bytes: 5 * 1024 * 1024,
            verify_concurrency: 2,
            retry: RetryConfig::default(),
        }
    }
}

/// Builds a `RunConfig` from the documented defaults, overriding only what
/// a caller specifies.
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
        }
    }

    pub fn confidence_threshold(mut self, value: f32) -> Self {
        self.config.confidence_threshold = value;
        self
    }

    pub fn max_hops(mut self, value: u32) -> Self {
        self.config.max_hops = value;
        self
    }

    pub fn images_per_query(mut self, value: usize) -> Self {
        self.config.images_per_query = value;
        self
    }

    pub fn max_images_searched(mut self, value: u32) -> Self {
        self.config.max_images_searched = value;
        self
    }

    pub fn max_images_recognized(mut self, value: u32) -> Self {
        self.config.max_images_recognized = value;
        self
    }

    pub fn max_planner_calls(mut self, value: u32) -> Self {
        self.config.max_planner_calls = value;
        self
    }

    pub fn fetch_timeout_ms(mut self, value: u64) -> Self {
        self.config.fetch_timeout_ms = value;
        self
    }

    pub fn max_image_bytes(mut self, value: u64) -> Self {
        self.config.max_image_bytes = value;
        self
    }

    pub fn verify_concurrency(mut self, value: usize) -> Self {
        self.config.verify_concurrency = value;
        self
    }

    pub fn retry(mut self, value: RetryConfig) -> Self {
        self.config.retry = value;
        self
    }

    pub fn build(self) -> RunConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RunConfig::default();
        assert_eq!(config.confidence_threshold, 80.0);
        assert_eq!(config.max_hops, 6);
        assert_eq!(config.images_per_query, 5);
        assert_eq!(config.max_images_searched, 200);
        assert_eq!(config.max_images_recognized, 200);
        assert_eq!(config.max_planner_calls, 50);
        assert_eq!(config.fetch_timeout_ms, 10_000);
        assert_eq!(config.max_image_bytes, 5 * 1024 * 1024);
        assert_eq!(config.verify_concurrency, 2);
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.retry.base_delay_ms, 200);
        assert_eq!(config.retry.backoff_factor, 2.0);
        assert_eq!(config.retry.jitter_ms, 50);
    }

    #[test]
    fn builder_overrides_only_specified_fields() {
        let config = RunConfigBuilder::new().max_hops(3).confidence_threshold(90.0).build();
        assert_eq!(config.max_hops, 3);
        assert_eq!(config.confidence_threshold, 90.0);
        assert_eq!(config.images_per_query, 5);
    }
}
