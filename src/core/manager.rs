//! Name-keyed registry of resource pools.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use crate::core::{
    build_audit_event, AdmissionError, AuditAction, AuditSink, BatchItem, BatchReport, PoolLimits,
    PoolUpdate, PoolView, Query, QueryExecutor, QueryOutcome, ResourcePool, SimulatedExecutor,
    Spawn, SystemTotals,
};

struct ManagerInner {
    /// Registry lock. Held only for map lookup and mutation, except in
    /// `drop_pool`, which takes a pool's counter lock beneath it. Pool code
    /// never takes the registry lock, so the order cannot cycle.
    pools: RwLock<BTreeMap<String, Arc<ResourcePool>>>,
    totals: SystemTotals,
    executor: Arc<dyn QueryExecutor>,
    audit: Mutex<Option<Box<dyn AuditSink>>>,
}

/// Registry of named pools.
///
/// Cloning is cheap and every clone shares the same registry, so a manager
/// can be moved into spawned tasks.
#[derive(Clone)]
pub struct PoolManager {
    inner: Arc<ManagerInner>,
}

impl fmt::Debug for PoolManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolManager")
            .field("totals", &self.inner.totals)
            .field("pools", &self.pool_names())
            .finish_non_exhaustive()
    }
}

impl Default for PoolManager {
    fn default() -> Self {
        Self::new(SystemTotals::default())
    }
}

impl PoolManager {
    /// Create an empty manager whose pools use the simulated executor.
    #[must_use]
    pub fn new(totals: SystemTotals) -> Self {
        Self::with_executor(totals, Arc::new(SimulatedExecutor::new()))
    }

    /// Create an empty manager; pools made by [`create_pool`](Self::create_pool) use `executor`.
    #[must_use]
    pub fn with_executor(totals: SystemTotals, executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                pools: RwLock::new(BTreeMap::new()),
                totals,
                executor,
                audit: Mutex::new(None),
            }),
        }
    }

    /// Attach (or replace) the audit sink.
    pub fn attach_audit(&self, sink: Box<dyn AuditSink>) {
        *self.inner.audit.lock() = Some(sink);
    }

    /// System totals shared by pools this manager creates.
    #[must_use]
    pub fn totals(&self) -> SystemTotals {
        self.inner.totals
    }

    /// Build a pool with this manager's totals and executor, and register it.
    pub fn create_pool(
        &self,
        name: impl Into<String>,
        limits: PoolLimits,
    ) -> Result<Arc<ResourcePool>, AdmissionError> {
        let pool = ResourcePool::new(name, limits, self.inner.totals)?
            .with_executor(Arc::clone(&self.inner.executor));
        let pool = Arc::new(pool);
        self.add_pool(Arc::clone(&pool));
        Ok(pool)
    }

    /// Register a pool under its name, replacing any pool already there.
    ///
    /// Queries already admitted to a replaced pool run to completion on it.
    /// Returns the replaced pool, if any.
    pub fn add_pool(&self, pool: impl Into<Arc<ResourcePool>>) -> Option<Arc<ResourcePool>> {
        let pool = pool.into();
        let name = pool.name().to_string();
        let replaced = self.inner.pools.write().insert(name.clone(), pool);
        if replaced.is_some() {
            tracing::info!("pool {} replaced", name);
        } else {
            tracing::info!("pool {} added", name);
        }
        self.record(&name, None, AuditAction::PoolAdded, None);
        replaced
    }

    /// Look up a pool.
    #[must_use]
    pub fn get_pool(&self, name: &str) -> Option<Arc<ResourcePool>> {
        self.inner.pools.read().get(name).cloned()
    }

    /// Registered pool names, in order.
    #[must_use]
    pub fn pool_names(&self) -> Vec<String> {
        self.inner.pools.read().keys().cloned().collect()
    }

    /// Number of registered pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.pools.read().len()
    }

    /// True if no pool is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.pools.read().is_empty()
    }

    /// Submit a query to the named pool and wait for its outcome.
    pub async fn submit_query_to_pool(&self, name: &str, query: Query) -> QueryOutcome {
        let query_id = query.id.clone();
        let outcome = match self.get_pool(name) {
            Some(pool) => pool.submit(query).await,
            None => {
                tracing::debug!("query {} addressed unknown pool {}", query_id, name);
                QueryOutcome::NoSuchPool
            }
        };
        let action = match outcome {
            QueryOutcome::Completed => AuditAction::QueryCompleted,
            QueryOutcome::TimedOut => AuditAction::QueryTimedOut,
            QueryOutcome::Rejected(_) => AuditAction::QueryRejected,
            QueryOutcome::NoSuchPool => AuditAction::QueryNoSuchPool,
        };
        self.record(name, Some(query_id), action, Some(outcome.to_string()));
        outcome
    }

    /// Submit every item on its own task and wait until all have reported.
    ///
    /// Each task sends its outcome through a channel; the batch completes
    /// when the last sender is gone, so a panicking task cannot hang it.
    pub async fn submit_batch<S: Spawn>(&self, items: Vec<BatchItem>, spawner: &S) -> BatchReport {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let submitted = items.len();
        for item in items {
            let manager = self.clone();
            let tx = tx.clone();
            spawner.spawn(async move {
                let id = item.query.id.clone();
                let outcome = manager.submit_query_to_pool(&item.pool, item.query).await;
                let _ = tx.send((id, outcome));
            });
        }
        drop(tx);

        let mut report = BatchReport {
            outcomes: Vec::with_capacity(submitted),
        };
        while let Some(entry) = rx.recv().await {
            report.outcomes.push(entry);
        }
        if report.len() < submitted {
            tracing::error!(
                "batch finished with {} of {} outcomes reported",
                report.len(),
                submitted
            );
        }
        report
    }

    /// Per-pool views in name order.
    ///
    /// Each view is consistent on its own; pools are copied one at a time,
    /// so views of different pools may come from different instants.
    #[must_use]
    pub fn snapshot_pools(&self) -> Vec<PoolView> {
        let pools: Vec<Arc<ResourcePool>> = self.inner.pools.read().values().cloned().collect();
        pools.iter().map(|p| p.view()).collect()
    }

    /// Remove an idle pool.
    ///
    /// `Ok(true)` when removed, `Ok(false)` when no such pool, and
    /// [`AdmissionError::StillDraining`] when queries are still admitted;
    /// in that case the pool stays registered.
    pub fn drop_pool(&self, name: &str) -> Result<bool, AdmissionError> {
        let result = {
            let mut pools = self.inner.pools.write();
            match pools.get(name).map(|pool| pool.try_retire()) {
                None => return Ok(false),
                Some(Err(in_flight)) => Err(in_flight),
                Some(Ok(())) => {
                    pools.remove(name);
                    Ok(())
                }
            }
        };

        match result {
            Ok(()) => {
                tracing::info!("pool {} dropped", name);
                self.record(name, None, AuditAction::PoolDropped, None);
                Ok(true)
            }
            Err(in_flight) => {
                tracing::warn!("pool {} still draining ({} in flight)", name, in_flight);
                self.record(
                    name,
                    None,
                    AuditAction::DropDeferred,
                    Some(format!("in_flight={in_flight}")),
                );
                Err(AdmissionError::StillDraining {
                    pool: name.to_string(),
                    in_flight,
                })
            }
        }
    }

    /// Retry [`drop_pool`](Self::drop_pool) each time the pool goes idle,
    /// until it succeeds or `timeout` elapses.
    pub async fn drain_pool(&self, name: &str, timeout: Duration) -> Result<bool, AdmissionError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.drop_pool(name) {
                Err(AdmissionError::StillDraining { .. }) => {}
                other => return other,
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AdmissionError::DrainTimeout(name.to_string()));
            }
            let Some(pool) = self.get_pool(name) else {
                return Ok(false);
            };
            if tokio::time::timeout_at(deadline, pool.wait_idle()).await.is_err() {
                return Err(AdmissionError::DrainTimeout(name.to_string()));
            }
        }
    }

    /// Apply a partial update to the named pool.
    ///
    /// `Ok(false)` when the pool does not exist. An invalid update is
    /// rejected before anything is mutated. Lowering a percentage below
    /// current usage revokes nothing: usage stays within the new limit only
    /// for admissions made after the change, once in-flight queries release.
    pub fn alter_pool(&self, name: &str, update: &PoolUpdate) -> Result<bool, AdmissionError> {
        update.validate()?;
        let Some(pool) = self.get_pool(name) else {
            tracing::debug!("alter of unknown pool {}", name);
            return Ok(false);
        };
        let limits = pool.apply_update(update)?;
        self.record(
            name,
            None,
            AuditAction::PoolAltered,
            Some(format!(
                "cpu={}% mem={}% concurrency={}",
                limits.max_cpu_percent, limits.max_mem_percent, limits.max_concurrency
            )),
        );
        Ok(true)
    }

    fn record(&self, pool: &str, query_id: Option<String>, action: AuditAction, detail: Option<String>) {
        if let Some(sink) = self.inner.audit.lock().as_mut() {
            sink.record(build_audit_event(pool, query_id, action, detail));
        }
    }
}
