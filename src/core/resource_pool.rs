//! Resource pool with CPU/memory accounting and a resizable concurrency gate.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use crate::core::gate::{ConcurrencyGate, GateAcquire};
use crate::core::{
    AdmissionError, PoolLimits, PoolUpdate, Query, QueryExecutor, QueryOutcome, RejectReason,
    SimulatedExecutor, SystemTotals,
};

/// Lifetime counters for one pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Queries that passed both the concurrency and the resource checks.
    pub admitted: u64,
    /// Queries rejected on resource grounds.
    pub rejected: u64,
    /// Admitted queries that finished within budget.
    pub completed: u64,
    /// Admitted queries that finished over budget.
    pub timed_out: u64,
    /// Admitted queries whose caller dropped the submission mid-execution.
    pub cancelled: u64,
}

/// Read-only copy of a pool taken under one lock acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolView {
    /// Pool name.
    pub name: String,
    /// Share of system CPU.
    pub max_cpu_percent: u32,
    /// Share of system memory.
    pub max_mem_percent: u32,
    /// Concurrency ceiling.
    pub max_concurrency: usize,
    /// Reserved CPU units.
    pub used_cpu: u64,
    /// Reserved memory units.
    pub used_memory: u64,
    /// CPU units the pool may reserve.
    pub cpu_limit: u64,
    /// Memory units the pool may reserve.
    pub mem_limit: u64,
    /// Outstanding gate tokens.
    pub in_flight: usize,
    /// Whether the pool has been retired by a drop.
    pub retired: bool,
    /// Lifetime counters.
    pub stats: PoolStats,
}

/// State guarded by the pool's counter lock.
#[derive(Debug)]
struct PoolState {
    limits: PoolLimits,
    used_cpu: u64,
    used_memory: u64,
    gate: ConcurrencyGate,
    stats: PoolStats,
}

/// A named capacity pool.
///
/// Counters and gate state share one `parking_lot::Mutex`; critical sections
/// only read and write fields. Tasks blocked on the gate wait on a
/// `tokio::sync::Notify` outside the lock.
pub struct ResourcePool {
    name: String,
    totals: SystemTotals,
    state: Mutex<PoolState>,
    /// Signalled when a gate token frees up, the gate grows, or it is retired.
    gate_waiters: Notify,
    /// Signalled when the last held token is released.
    idle: Notify,
    executor: Arc<dyn QueryExecutor>,
}

impl fmt::Debug for ResourcePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePool")
            .field("name", &self.name)
            .field("totals", &self.totals)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl ResourcePool {
    /// Create a pool using the simulated executor.
    pub fn new(
        name: impl Into<String>,
        limits: PoolLimits,
        totals: SystemTotals,
    ) -> Result<Self, AdmissionError> {
        let name = name.into();
        if name.is_empty() {
            return Err(AdmissionError::InvalidConfig("pool name must not be empty".into()));
        }
        limits.validate().map_err(|e| match e {
            AdmissionError::InvalidConfig(msg) => {
                AdmissionError::InvalidConfig(format!("pool `{name}`: {msg}"))
            }
            other => other,
        })?;
        Ok(Self {
            name,
            totals,
            state: Mutex::new(PoolState {
                limits,
                used_cpu: 0,
                used_memory: 0,
                gate: ConcurrencyGate::new(limits.max_concurrency),
                stats: PoolStats::default(),
            }),
            gate_waiters: Notify::new(),
            idle: Notify::new(),
            executor: Arc::new(SimulatedExecutor::new()),
        })
    }

    /// Replace the executor used for admitted queries.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn QueryExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Pool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// System totals the limits are computed against.
    #[must_use]
    pub const fn totals(&self) -> SystemTotals {
        self.totals
    }

    /// Current limits.
    #[must_use]
    pub fn limits(&self) -> PoolLimits {
        self.state.lock().limits
    }

    /// Number of admitted (token-holding) queries.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.state.lock().gate.held()
    }

    /// Snapshot all non-synchronization fields under one lock acquisition.
    #[must_use]
    pub fn view(&self) -> PoolView {
        let state = self.state.lock();
        PoolView {
            name: self.name.clone(),
            max_cpu_percent: state.limits.max_cpu_percent,
            max_mem_percent: state.limits.max_mem_percent,
            max_concurrency: state.limits.max_concurrency,
            used_cpu: state.used_cpu,
            used_memory: state.used_memory,
            cpu_limit: self.totals.cpu_limit(state.limits.max_cpu_percent),
            mem_limit: self.totals.mem_limit(state.limits.max_mem_percent),
            in_flight: state.gate.held(),
            retired: state.gate.is_retired(),
            stats: state.stats,
        }
    }

    /// Admit and run one query.
    ///
    /// Waits for a concurrency token, then checks and reserves CPU and
    /// memory. A query that does not fit is rejected, not queued. The token
    /// and the reservation are released when the run finishes, or when this
    /// future is dropped mid-run.
    pub async fn submit(&self, query: Query) -> QueryOutcome {
        let Some(mut guard) = self.acquire_token().await else {
            tracing::debug!("pool {} retired, query {} not admitted", self.name, query.id);
            return QueryOutcome::NoSuchPool;
        };

        if let Err(reason) = guard.reserve(&query) {
            tracing::warn!(
                "query {} rejected by pool {}: {:?} limit exceeded",
                query.id,
                self.name,
                reason
            );
            return QueryOutcome::Rejected(reason);
        }
        tracing::debug!("query {} admitted to pool {}", query.id, self.name);

        self.executor.execute(&query).await;

        let outcome = if query.exceeds_budget() {
            tracing::warn!(
                "query {} timed out in pool {} ({:?} > {:?})",
                query.id,
                self.name,
                query.execution_time,
                query.timeout_budget
            );
            QueryOutcome::TimedOut
        } else {
            QueryOutcome::Completed
        };
        guard.finish(outcome);
        outcome
    }

    /// Wait until no tokens are held.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            let held = self.state.lock().gate.held();
            if held == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Apply a partial update; returns the resulting limits.
    ///
    /// Shrinking a limit never revokes what is already held or reserved;
    /// it only affects later admissions.
    pub fn apply_update(&self, update: &PoolUpdate) -> Result<PoolLimits, AdmissionError> {
        update.validate()?;
        let (limits, grew) = {
            let mut state = self.state.lock();
            if let Some(p) = update.cpu_percent() {
                state.limits.max_cpu_percent = p;
            }
            if let Some(p) = update.mem_percent() {
                state.limits.max_mem_percent = p;
            }
            let mut grew = false;
            if let Some(n) = update.concurrency() {
                state.limits.max_concurrency = n;
                grew = state.gate.resize(n);
            }
            (state.limits, grew)
        };
        if grew {
            self.gate_waiters.notify_waiters();
        }
        tracing::info!(
            "pool {} limits now cpu={}% mem={}% concurrency={}",
            self.name,
            limits.max_cpu_percent,
            limits.max_mem_percent,
            limits.max_concurrency
        );
        Ok(limits)
    }

    /// Change only the concurrency ceiling.
    pub fn resize(&self, max_concurrency: usize) -> Result<PoolLimits, AdmissionError> {
        if max_concurrency == 0 {
            return Err(AdmissionError::InvalidConfig(
                "max_concurrency must be greater than 0".into(),
            ));
        }
        self.apply_update(&PoolUpdate::new().with_concurrency(max_concurrency))
    }

    /// Retire the gate if nothing is admitted. Returns the in-flight count otherwise.
    pub(crate) fn try_retire(&self) -> Result<(), usize> {
        {
            let mut state = self.state.lock();
            let held = state.gate.held();
            if held > 0 {
                return Err(held);
            }
            state.gate.retire();
        }
        self.gate_waiters.notify_waiters();
        Ok(())
    }

    async fn acquire_token(&self) -> Option<AdmissionGuard<'_>> {
        loop {
            let notified = self.gate_waiters.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            let attempt = self.state.lock().gate.try_acquire();
            match attempt {
                GateAcquire::Acquired => {
                    return Some(AdmissionGuard {
                        pool: self,
                        cpu: 0,
                        memory: 0,
                        reserved: false,
                        outcome: None,
                    })
                }
                GateAcquire::Retired => return None,
                GateAcquire::Full => {}
            }
            notified.await;
        }
    }
}

/// Owns one gate token and, once reserved, one query's resources.
struct AdmissionGuard<'a> {
    pool: &'a ResourcePool,
    cpu: u64,
    memory: u64,
    reserved: bool,
    outcome: Option<QueryOutcome>,
}

impl AdmissionGuard<'_> {
    /// Check both limits and reserve. Sum equal to the limit is accepted.
    fn reserve(&mut self, query: &Query) -> Result<(), RejectReason> {
        let pool = self.pool;
        let mut state = pool.state.lock();
        let cpu_limit = pool.totals.cpu_limit(state.limits.max_cpu_percent);
        let mem_limit = pool.totals.mem_limit(state.limits.max_mem_percent);
        let cpu_over = state.used_cpu.saturating_add(query.cpu_request) > cpu_limit;
        let mem_over = state.used_memory.saturating_add(query.mem_request) > mem_limit;
        if let Some(reason) = RejectReason::from_flags(cpu_over, mem_over) {
            state.stats.rejected += 1;
            return Err(reason);
        }
        state.used_cpu += query.cpu_request;
        state.used_memory += query.mem_request;
        state.stats.admitted += 1;
        self.cpu = query.cpu_request;
        self.memory = query.mem_request;
        self.reserved = true;
        Ok(())
    }

    fn finish(mut self, outcome: QueryOutcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for AdmissionGuard<'_> {
    fn drop(&mut self) {
        let pool = self.pool;
        let (wake_one, now_idle) = {
            let mut state = pool.state.lock();
            state.used_cpu -= self.cpu;
            state.used_memory -= self.memory;
            match self.outcome {
                Some(QueryOutcome::Completed) => state.stats.completed += 1,
                Some(QueryOutcome::TimedOut) => state.stats.timed_out += 1,
                Some(_) => {}
                // reserved but never finished: the caller dropped the future
                None if self.reserved => state.stats.cancelled += 1,
                None => {}
            }
            let wake_one = state.gate.release();
            (wake_one, state.gate.held() == 0)
        };
        tracing::debug!(
            "pool {} released cpu={} mem={}",
            pool.name,
            self.cpu,
            self.memory
        );
        if wake_one {
            pool.gate_waiters.notify_one();
        }
        if now_idle {
            pool.idle.notify_waiters();
        }
    }
}
