//! Error types for pool management operations.

use thiserror::Error;

/// Errors produced by pool management operations.
///
/// Query admission never fails with an error; its result is a
/// [`QueryOutcome`](crate::core::QueryOutcome) value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The named pool is not registered.
    #[error("no such pool: {0}")]
    NoSuchPool(String),
    /// Removal was requested while queries are still admitted.
    #[error("pool `{pool}` still draining ({in_flight} in flight)")]
    StillDraining {
        /// Pool name.
        pool: String,
        /// Admitted queries at the time of the request.
        in_flight: usize,
    },
    /// Limits or an update failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// The pool did not become idle before the drain deadline.
    #[error("drain timed out: {0}")]
    DrainTimeout(String),
}

impl AdmissionError {
    /// Whether the caller may retry the same operation later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StillDraining { .. } | Self::DrainTimeout(_))
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
