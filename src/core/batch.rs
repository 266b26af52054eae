//! Fire-and-forget submission: spawner abstraction and batch reports.

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::core::{Query, QueryId, QueryOutcome};

/// Abstraction for spawning query tasks on a runtime.
pub trait Spawn {
    /// Spawn a future and forget it.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// One query addressed to a named pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Target pool.
    pub pool: String,
    /// Query to submit.
    pub query: Query,
}

impl BatchItem {
    /// Address `query` to `pool`.
    pub fn new(pool: impl Into<String>, query: Query) -> Self {
        Self {
            pool: pool.into(),
            query,
        }
    }
}

/// Outcomes of a batch, gathered once every query has reported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Per-query outcomes in completion order.
    pub outcomes: Vec<(QueryId, QueryOutcome)>,
}

impl BatchReport {
    /// Number of queries that reported.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True when the batch was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// How many queries ended with `outcome`.
    #[must_use]
    pub fn count(&self, outcome: QueryOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }

    /// How many queries were rejected for any reason.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_rejected()).count()
    }

    /// Outcome counts keyed by display label.
    #[must_use]
    pub fn tally(&self) -> HashMap<String, usize> {
        let mut tally = HashMap::new();
        for (_, outcome) in &self.outcomes {
            *tally.entry(outcome.to_string()).or_insert(0) += 1;
        }
        tally
    }
}
