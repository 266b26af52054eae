//! Query values and admission outcomes.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Opaque query identifier, used for logging and audit only.
pub type QueryId = String;

/// One unit of work submitted to a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Query identifier.
    pub id: QueryId,
    /// CPU demand in abstract units.
    pub cpu_request: u64,
    /// Memory demand in abstract units.
    pub mem_request: u64,
    /// How long the simulated execution takes.
    pub execution_time: Duration,
    /// Budget the execution is classified against.
    pub timeout_budget: Duration,
}

impl Query {
    /// Create a query with a random id, zero execution time and an unbounded budget.
    #[must_use]
    pub fn new(cpu_request: u64, mem_request: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            cpu_request,
            mem_request,
            execution_time: Duration::ZERO,
            timeout_budget: Duration::MAX,
        }
    }

    /// Replace the generated id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<QueryId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the simulated execution time.
    #[must_use]
    pub const fn with_execution_time(mut self, execution_time: Duration) -> Self {
        self.execution_time = execution_time;
        self
    }

    /// Set the timeout budget.
    #[must_use]
    pub const fn with_timeout_budget(mut self, timeout_budget: Duration) -> Self {
        self.timeout_budget = timeout_budget;
        self
    }

    /// True when the run is classified as timed out.
    #[must_use]
    pub fn exceeds_budget(&self) -> bool {
        self.execution_time > self.timeout_budget
    }
}

/// Which limit caused a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// CPU limit would be exceeded.
    Cpu,
    /// Memory limit would be exceeded.
    Memory,
    /// Both limits would be exceeded.
    CpuAndMemory,
}

impl RejectReason {
    pub(crate) const fn from_flags(cpu: bool, memory: bool) -> Option<Self> {
        match (cpu, memory) {
            (true, true) => Some(Self::CpuAndMemory),
            (true, false) => Some(Self::Cpu),
            (false, true) => Some(Self::Memory),
            (false, false) => None,
        }
    }
}

/// Result classification for one submitted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Admitted and finished within its budget.
    Completed,
    /// Admitted and finished, but over its budget.
    TimedOut,
    /// Not admitted because a resource limit would be exceeded.
    Rejected(RejectReason),
    /// The target pool is not registered (or was removed before admission).
    NoSuchPool,
}

impl QueryOutcome {
    /// Whether the query was admitted and executed.
    #[must_use]
    pub const fn was_admitted(self) -> bool {
        matches!(self, Self::Completed | Self::TimedOut)
    }

    /// Whether the query was rejected on resource grounds.
    #[must_use]
    pub const fn is_rejected(self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::TimedOut => write!(f, "timed_out"),
            Self::Rejected(RejectReason::Cpu) => write!(f, "rejected (cpu)"),
            Self::Rejected(RejectReason::Memory) => write!(f, "rejected (memory)"),
            Self::Rejected(RejectReason::CpuAndMemory) => write!(f, "rejected (cpu+memory)"),
            Self::NoSuchPool => write!(f, "no_such_pool"),
        }
    }
}
