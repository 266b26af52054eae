//! Tests for configuration validation

use std::collections::HashMap;

use admission_pools::config::{ManagerConfig, PoolConfig, TOTAL_CPU_ENV, TOTAL_MEM_ENV};
use std::sync::Arc;

use admission_pools::builders::build_manager;
use admission_pools::core::{PoolLimits, Query, QueryOutcome, SimulatedExecutor, SystemTotals};

fn pool_config(cpu: u32, mem: u32, concurrency: usize) -> PoolConfig {
    PoolConfig {
        max_cpu_percent: cpu,
        max_mem_percent: mem,
        max_concurrency: concurrency,
    }
}

#[test]
fn test_pool_config_validation() {
    let valid = pool_config(60, 65, 40);
    assert!(valid.validate().is_ok());
    assert_eq!(valid.limits(), PoolLimits::new(60, 65, 40));
}

#[test]
fn test_pool_config_invalid_concurrency() {
    assert!(pool_config(60, 65, 0).validate().is_err());
}

#[test]
fn test_pool_config_invalid_percentages() {
    assert!(pool_config(101, 65, 1).validate().is_err());
    assert!(pool_config(60, 200, 1).validate().is_err());
}

#[test]
fn test_manager_config_validation() {
    let mut pools = HashMap::new();
    pools.insert("pool1".to_string(), pool_config(60, 65, 40));

    let config = ManagerConfig {
        system: SystemTotals::default(),
        pools,
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_manager_config_rejects_bad_pool() {
    let mut pools = HashMap::new();
    pools.insert("broken".to_string(), pool_config(60, 65, 0));
    let config = ManagerConfig {
        system: SystemTotals::default(),
        pools,
    };
    let err = config.validate().unwrap_err();
    assert!(err.contains("broken"));
}

#[test]
fn test_manager_config_rejects_zero_totals() {
    let config = ManagerConfig {
        system: SystemTotals { cpu: 0, memory: 100 },
        pools: HashMap::new(),
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_manager_config_from_json() {
    let json = r#"{
        "system": { "cpu": 64, "memory": 256 },
        "pools": {
            "test": { "max_cpu_percent": 60, "max_mem_percent": 65, "max_concurrency": 40 },
            "test2": { "max_cpu_percent": 60, "max_mem_percent": 75, "max_concurrency": 35 }
        }
    }"#;

    let config = ManagerConfig::from_json_str(json).unwrap();
    assert_eq!(config.system, SystemTotals { cpu: 64, memory: 256 });
    assert_eq!(config.pools.len(), 2);
    assert_eq!(config.pools["test2"].max_concurrency, 35);
}

#[tokio::test]
async fn test_manager_config_with_max_totals_admits() {
    let json = r#"{
        "system": { "cpu": 18446744073709551615, "memory": 100 },
        "pools": {
            "big": { "max_cpu_percent": 100, "max_mem_percent": 50, "max_concurrency": 2 }
        }
    }"#;
    let config = ManagerConfig::from_json_str(json).unwrap();
    let manager = build_manager(&config, Arc::new(SimulatedExecutor::instant())).unwrap();

    let outcome = manager.submit_query_to_pool("big", Query::new(1, 1)).await;
    assert_eq!(outcome, QueryOutcome::Completed);

    let view = &manager.snapshot_pools()[0];
    assert_eq!(view.cpu_limit, u64::MAX);
    assert_eq!(view.mem_limit, 50);
    assert_eq!(view.used_cpu, 0);
}

#[test]
fn test_manager_config_default_totals() {
    let json = r#"{ "pools": {} }"#;
    let config = ManagerConfig::from_json_str(json).unwrap();
    assert_eq!(config.system, SystemTotals::default());
}

#[test]
fn test_manager_config_parse_error() {
    assert!(ManagerConfig::from_json_str("{ not json").is_err());
    assert!(ManagerConfig::from_json_file("/definitely/not/here.json").is_err());
}

#[test]
fn test_system_totals_from_env() {
    std::env::set_var(TOTAL_CPU_ENV, "64");
    std::env::set_var(TOTAL_MEM_ENV, "512");
    let totals = SystemTotals::from_env().unwrap();
    assert_eq!(totals, SystemTotals { cpu: 64, memory: 512 });

    std::env::set_var(TOTAL_CPU_ENV, "lots");
    assert!(SystemTotals::from_env().is_err());

    std::env::set_var(TOTAL_CPU_ENV, "0");
    assert!(SystemTotals::from_env().is_err());

    std::env::remove_var(TOTAL_CPU_ENV);
    std::env::remove_var(TOTAL_MEM_ENV);
    assert_eq!(SystemTotals::from_env().unwrap(), SystemTotals::default());
}
