//! Tests for the API surface

use std::sync::Arc;

use admission_pools::core::{
    PoolLimits, PoolManager, PoolUpdate, Query, QueryOutcome, SimulatedExecutor, SystemTotals,
};
use admission_pools::runtime::api::{self, AlterRequest, SubmitRequest};

fn manager() -> PoolManager {
    let manager = PoolManager::with_executor(
        SystemTotals::default(),
        Arc::new(SimulatedExecutor::instant()),
    );
    manager
        .create_pool("test", PoolLimits::new(60, 65, 40))
        .unwrap();
    manager
}

#[tokio::test]
async fn test_submit_request() {
    let manager = manager();
    let resp = api::submit(
        &manager,
        SubmitRequest {
            pool: "test".into(),
            query: Query::new(10, 20).with_id("q1"),
        },
    )
    .await;
    assert_eq!(resp.query_id, "q1");
    assert_eq!(resp.outcome, QueryOutcome::Completed);
}

#[test]
fn test_alter_and_drop_requests() {
    let manager = manager();
    let req = AlterRequest {
        pool: "test".into(),
        update: PoolUpdate::new().with_concurrency(50),
    };
    assert!(api::alter(&manager, &req).applied);

    let missing = AlterRequest {
        pool: "nope".into(),
        update: PoolUpdate::new().with_concurrency(50),
    };
    let resp = api::alter(&manager, &missing);
    assert!(!resp.applied);
    assert_eq!(resp.reason.as_deref(), Some("no such pool: nope"));

    let invalid = AlterRequest {
        pool: "test".into(),
        update: PoolUpdate::new().with_cpu_percent(150),
    };
    let resp = api::alter(&manager, &invalid);
    assert!(!resp.applied);
    assert!(resp.reason.unwrap().starts_with("invalid config"));

    assert_eq!(api::list_pools(&manager)[0].max_concurrency, 50);
    assert!(api::drop_pool(&manager, "test").applied);
    let resp = api::drop_pool(&manager, "test");
    assert!(!resp.applied);
    assert_eq!(resp.reason.as_deref(), Some("no such pool: test"));
    assert_eq!(api::health(&manager).pools, 0);
}

#[test]
fn test_alter_request_json() {
    let req: AlterRequest =
        serde_json::from_str(r#"{ "pool": "test", "max_concurrency": 50 }"#).unwrap();
    assert_eq!(req.pool, "test");
    assert_eq!(req.update.max_concurrency, Some(50));
    assert_eq!(req.update.max_cpu_percent, None);
}
