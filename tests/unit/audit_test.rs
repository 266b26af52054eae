//! Tests for audit sink

use admission_pools::core::{build_audit_event, AuditAction, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(
        "pool1",
        Some("q1".to_string()),
        AuditAction::QueryCompleted,
        Some("completed".to_string()),
    );

    sink.record(event);
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].pool, "pool1");
    assert_eq!(events[0].query_id.as_deref(), Some("q1"));
    assert_eq!(events[0].action, AuditAction::QueryCompleted);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event("pool1", None, AuditAction::PoolAdded, None));
    sink.record(build_audit_event("pool1", None, AuditAction::PoolAltered, None));
    sink.record(build_audit_event("pool1", None, AuditAction::PoolDropped, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action, AuditAction::PoolAltered); // first one popped
    assert_eq!(events[1].action, AuditAction::PoolDropped);
}

#[test]
fn test_build_audit_event() {
    let a = build_audit_event("pool1", None, AuditAction::DropDeferred, Some("in_flight=2".into()));
    let b = build_audit_event("pool1", None, AuditAction::DropDeferred, None);

    assert_ne!(a.event_id, b.event_id);
    assert_eq!(a.detail, Some("in_flight=2".to_string()));
    assert!(a.created_at_ms > 0);
}

#[test]
fn test_audit_action_serializes_snake_case() {
    let json = serde_json::to_string(&AuditAction::QueryNoSuchPool).unwrap();
    assert_eq!(json, "\"query_no_such_pool\"");
}
