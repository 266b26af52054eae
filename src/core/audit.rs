//! Audit sink implementations.
//!
//! Records pool lifecycle changes and query outcomes. Only an in-memory,
//! bounded sink is provided; pool state is never persisted.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::util::clock::now_ms;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Pool registered (or replaced).
    PoolAdded,
    /// Pool limits changed.
    PoolAltered,
    /// Pool removed from the registry.
    PoolDropped,
    /// Removal deferred because queries were in flight.
    DropDeferred,
    /// Query finished within budget.
    QueryCompleted,
    /// Query finished over budget.
    QueryTimedOut,
    /// Query rejected on resource grounds.
    QueryRejected,
    /// Query addressed an unknown pool.
    QueryNoSuchPool,
}

/// Audit event structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Pool name.
    pub pool: String,
    /// Related query, if any.
    pub query_id: Option<String>,
    /// Action taken.
    pub action: AuditAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Helper to build an audit event with a fresh id and the current time.
pub fn build_audit_event(
    pool: impl Into<String>,
    query_id: Option<String>,
    action: AuditAction,
    detail: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        pool: pool.into(),
        query_id,
        action,
        created_at_ms: now_ms(),
        detail,
    }
}

/// Shared sinks, so a caller can keep a handle and read what was recorded.
impl<S: AuditSink> AuditSink for std::sync::Arc<parking_lot::Mutex<S>> {
    fn record(&mut self, event: AuditEvent) {
        self.lock().record(event);
    }
}
