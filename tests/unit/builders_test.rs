//! Tests for builders

use std::collections::HashMap;
use std::sync::Arc;

use admission_pools::builders::build_manager;
use admission_pools::config::{ManagerConfig, PoolConfig};
use admission_pools::core::{PoolLimits, SimulatedExecutor, SystemTotals};

#[test]
fn test_build_manager_from_config() {
    let mut pools = HashMap::new();
    pools.insert(
        "test".to_string(),
        PoolConfig {
            max_cpu_percent: 60,
            max_mem_percent: 65,
            max_concurrency: 40,
        },
    );
    pools.insert(
        "test2".to_string(),
        PoolConfig {
            max_cpu_percent: 60,
            max_mem_percent: 75,
            max_concurrency: 35,
        },
    );
    let cfg = ManagerConfig {
        system: SystemTotals { cpu: 200, memory: 100 },
        pools,
    };

    let manager = build_manager(&cfg, Arc::new(SimulatedExecutor::instant())).unwrap();
    assert_eq!(manager.pool_names(), vec!["test", "test2"]);
    assert_eq!(manager.totals(), SystemTotals { cpu: 200, memory: 100 });

    let pool = manager.get_pool("test").unwrap();
    assert_eq!(pool.limits(), PoolLimits::new(60, 65, 40));
    assert_eq!(pool.view().cpu_limit, 120);
}

#[test]
fn test_build_manager_rejects_invalid_config() {
    let mut pools = HashMap::new();
    pools.insert(
        "bad".to_string(),
        PoolConfig {
            max_cpu_percent: 60,
            max_mem_percent: 65,
            max_concurrency: 0,
        },
    );
    let cfg = ManagerConfig {
        system: SystemTotals::default(),
        pools,
    };
    assert!(build_manager(&cfg, Arc::new(SimulatedExecutor::instant())).is_err());
}
