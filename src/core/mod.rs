//! Admission control: pools, the concurrency gate, and the pool registry.

pub mod audit;
pub mod batch;
pub mod error;
pub mod executor;
pub mod gate;
pub mod limits;
pub mod manager;
pub mod query;
pub mod resource_pool;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use batch::{BatchItem, BatchReport, Spawn};
pub use error::{AdmissionError, AppResult};
pub use executor::{QueryExecutor, SimulatedExecutor};
pub use gate::{ConcurrencyGate, GateAcquire};
pub use limits::{
    PoolLimits, PoolUpdate, SystemTotals, DEFAULT_SYSTEM_TOTAL_CPU, DEFAULT_SYSTEM_TOTAL_MEM,
};
pub use manager::PoolManager;
pub use query::{Query, QueryId, QueryOutcome, RejectReason};
pub use resource_pool::{PoolStats, PoolView, ResourcePool};
