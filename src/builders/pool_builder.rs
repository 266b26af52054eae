//! Builders to construct a pool manager from configuration.

use std::sync::Arc;

use crate::config::ManagerConfig;
use crate::core::{AdmissionError, PoolManager, QueryExecutor};

/// Build a manager holding every pool in `cfg`.
pub fn build_manager(
    cfg: &ManagerConfig,
    executor: Arc<dyn QueryExecutor>,
) -> Result<PoolManager, AdmissionError> {
    cfg.validate()
        .map_err(|e| AdmissionError::InvalidConfig(format!("config invalid: {e}")))?;

    let manager = PoolManager::with_executor(cfg.system, executor);
    for (name, pool_cfg) in &cfg.pools {
        manager.create_pool(name.clone(), pool_cfg.limits())?;
    }
    tracing::info!("built manager with {} pools", manager.len());
    Ok(manager)
}
