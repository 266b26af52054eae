//! Pool and manager configuration structures.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, PoolLimits, SystemTotals, DEFAULT_SYSTEM_TOTAL_CPU, DEFAULT_SYSTEM_TOTAL_MEM};

/// Environment variable overriding total CPU units.
pub const TOTAL_CPU_ENV: &str = "ADMISSION_TOTAL_CPU";
/// Environment variable overriding total memory units.
pub const TOTAL_MEM_ENV: &str = "ADMISSION_TOTAL_MEM";

/// Pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Share of system CPU, 0-100.
    pub max_cpu_percent: u32,
    /// Share of system memory, 0-100.
    pub max_mem_percent: u32,
    /// Maximum simultaneously admitted queries.
    pub max_concurrency: usize,
}

/// Root manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// System-wide totals; defaults to 100/100 when omitted.
    #[serde(default)]
    pub system: SystemTotals,
    /// Map of pool name to configuration.
    pub pools: HashMap<String, PoolConfig>,
}

impl PoolConfig {
    /// Limits described by this configuration.
    #[must_use]
    pub const fn limits(&self) -> PoolLimits {
        PoolLimits::new(self.max_cpu_percent, self.max_mem_percent, self.max_concurrency)
    }

    /// Validate pool configuration values.
    pub fn validate(&self) -> Result<(), String> {
        self.limits().validate().map_err(|e| e.to_string())
    }
}

impl ManagerConfig {
    /// Validate totals and every pool. An empty pool map is allowed.
    pub fn validate(&self) -> Result<(), String> {
        if self.system.cpu == 0 || self.system.memory == 0 {
            return Err("system totals must be greater than 0".into());
        }
        for (name, pool) in &self.pools {
            if name.is_empty() {
                return Err("pool names must not be empty".into());
            }
            pool.validate()
                .map_err(|e| format!("pool `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse manager configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json_str(&raw).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
    }
}

impl SystemTotals {
    /// Load totals from the environment (after reading a `.env` file if present).
    ///
    /// Unset variables fall back to the defaults; unparsable or zero values are errors.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Ok(Self {
            cpu: env_total(TOTAL_CPU_ENV, DEFAULT_SYSTEM_TOTAL_CPU)?,
            memory: env_total(TOTAL_MEM_ENV, DEFAULT_SYSTEM_TOTAL_MEM)?,
        })
    }
}

fn env_total(key: &str, default: u64) -> AppResult<u64> {
    match std::env::var(key) {
        Ok(raw) => {
            let value: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{key} must be an unsigned integer, got `{raw}`"))?;
            anyhow::ensure!(value > 0, "{key} must be greater than 0");
            Ok(value)
        }
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(anyhow::anyhow!("{key}: {e}")),
    }
}
