//! Error types for copresence-core.

use thiserror::Error;

/// Result type alias using copresence-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during investigation orchestration.
#[derive(Error, Debug)]
pub enum Error {
    /// The source/target pair could not be used to start a run.
    #[error("invalid input: {0}")]
    Input(String),

    /// A provider (search, recognizer, scene filter, planner) returned an error.
    #[error("provider error: {provider} - {message}")]
    Provider {
        provider: String,
        message: String,
        /// Whether this error is worth a bounded retry.
        transient: bool,
    },

    /// Fetching raw image bytes for a candidate URL failed.
    #[error("image fetch failed: {reason}")]
    FetchFailed { reason: String },

    /// One of the four budget counters reached its ceiling.
    #[error("budget exhausted: {resource}")]
    BudgetExhausted { resource: String },

    /// Operation timed out.
    #[error("operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The run was cancelled by an external signal.
    #[error("run cancelled")]
    Cancelled,

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>, transient: bool) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            transient,
        }
    }

    pub fn fetch_failed(reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            reason: reason.into(),
        }
    }

    pub fn budget_exhausted(resource: impl Into<String>) -> Self {
        Self::BudgetExhausted {
            resource: resource.into(),
        }
    }

    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// True if this error represents a transient provider failure worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Provider { transient, .. } => *transient,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}
