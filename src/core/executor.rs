//! Query execution trait and the simulated executor.

use std::time::Duration;

use async_trait::async_trait;

use super::Query;

/// Runs an admitted query.
///
/// The pool calls this while the query holds its gate token and resource
/// reservation. Timeout classification is done by the pool from the
/// query's own fields, so implementations only need to do the work.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use admission_pools::core::{Query, QueryExecutor};
///
/// struct LoggingExecutor;
///
/// #[async_trait]
/// impl QueryExecutor for LoggingExecutor {
///     async fn execute(&self, query: &Query) {
///         tracing::info!("running {}", query.id);
///     }
/// }
/// ```
#[async_trait]
pub trait QueryExecutor: Send + Sync + 'static {
    /// Execute the query.
    async fn execute(&self, query: &Query);
}

/// Simulates execution by sleeping for the query's execution time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedExecutor {
    scale: f64,
}

impl SimulatedExecutor {
    /// Sleep for the full execution time.
    #[must_use]
    pub const fn new() -> Self {
        Self { scale: 1.0 }
    }

    /// Sleep for `execution_time * scale`. A scale of zero (or below) skips the sleep.
    #[must_use]
    pub const fn scaled(scale: f64) -> Self {
        Self { scale }
    }

    /// Never sleep.
    #[must_use]
    pub const fn instant() -> Self {
        Self { scale: 0.0 }
    }

    fn simulated_duration(&self, query: &Query) -> Duration {
        if self.scale <= 0.0 || query.execution_time.is_zero() {
            return Duration::ZERO;
        }
        query.execution_time.mul_f64(self.scale)
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryExecutor for SimulatedExecutor {
    async fn execute(&self, query: &Query) {
        let wait = self.simulated_duration(query);
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}
