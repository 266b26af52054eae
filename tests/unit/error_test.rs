//! Tests for error types

use admission_pools::core::AdmissionError;

#[test]
fn test_no_such_pool_error() {
    let err = AdmissionError::NoSuchPool("reports".to_string());
    assert_eq!(format!("{}", err), "no such pool: reports");
    assert!(!err.is_retryable());
}

#[test]
fn test_still_draining_error() {
    let err = AdmissionError::StillDraining {
        pool: "reports".to_string(),
        in_flight: 3,
    };
    assert_eq!(format!("{}", err), "pool `reports` still draining (3 in flight)");
    assert!(err.is_retryable());
}

#[test]
fn test_invalid_config_error() {
    let err = AdmissionError::InvalidConfig("max_concurrency must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid config: max_concurrency must be greater than 0"
    );
}

#[test]
fn test_drain_timeout_error() {
    let err = AdmissionError::DrainTimeout("reports".to_string());
    assert_eq!(format!("{}", err), "drain timed out: reports");
    assert!(err.is_retryable());
}
