//! Tests for utility functions

use admission_pools::util::{init_tracing, now_ms};

#[test]
fn test_now_ms_moves_forward() {
    let a = now_ms();
    let b = now_ms();
    assert!(a > 0);
    assert!(b >= a);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialized twice without panicking");
}
