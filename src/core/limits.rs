//! Capacity limits, system totals and partial limit updates.

use serde::{Deserialize, Serialize};

use crate::core::AdmissionError;

/// Default total CPU units for the process.
pub const DEFAULT_SYSTEM_TOTAL_CPU: u64 = 100;
/// Default total memory units for the process.
pub const DEFAULT_SYSTEM_TOTAL_MEM: u64 = 100;

/// Process-wide capacity totals that pool percentages are taken of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemTotals {
    /// Total CPU units.
    pub cpu: u64,
    /// Total memory units.
    pub memory: u64,
}

impl Default for SystemTotals {
    fn default() -> Self {
        Self {
            cpu: DEFAULT_SYSTEM_TOTAL_CPU,
            memory: DEFAULT_SYSTEM_TOTAL_MEM,
        }
    }
}

impl SystemTotals {
    /// CPU units available to a pool holding `percent` of the system.
    #[must_use]
    pub const fn cpu_limit(&self, percent: u32) -> u64 {
        share_of(self.cpu, percent)
    }

    /// Memory units available to a pool holding `percent` of the system.
    #[must_use]
    pub const fn mem_limit(&self, percent: u32) -> u64 {
        share_of(self.memory, percent)
    }
}

// Computed in u128; saturates at u64::MAX when percent exceeds 100.
const fn share_of(total: u64, percent: u32) -> u64 {
    let share = total as u128 * percent as u128 / 100;
    if share > u64::MAX as u128 {
        u64::MAX
    } else {
        share as u64
    }
}

/// Limits enforced by one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolLimits {
    /// Share of system CPU, 0-100.
    pub max_cpu_percent: u32,
    /// Share of system memory, 0-100.
    pub max_mem_percent: u32,
    /// Ceiling on simultaneously admitted queries.
    pub max_concurrency: usize,
}

impl PoolLimits {
    /// Create limits; call [`validate`](Self::validate) before use.
    #[must_use]
    pub const fn new(max_cpu_percent: u32, max_mem_percent: u32, max_concurrency: usize) -> Self {
        Self {
            max_cpu_percent,
            max_mem_percent,
            max_concurrency,
        }
    }

    /// Validate percentage ranges and the concurrency ceiling.
    pub fn validate(&self) -> Result<(), AdmissionError> {
        check_percent("max_cpu_percent", self.max_cpu_percent)?;
        check_percent("max_mem_percent", self.max_mem_percent)?;
        if self.max_concurrency == 0 {
            return Err(AdmissionError::InvalidConfig(
                "max_concurrency must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Partial update applied by `alter_pool`.
///
/// `None` and `Some(0)` both leave the field unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolUpdate {
    /// New CPU share.
    #[serde(default)]
    pub max_cpu_percent: Option<u32>,
    /// New memory share.
    #[serde(default)]
    pub max_mem_percent: Option<u32>,
    /// New concurrency ceiling.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl PoolUpdate {
    /// Empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the CPU share.
    #[must_use]
    pub const fn with_cpu_percent(mut self, percent: u32) -> Self {
        self.max_cpu_percent = Some(percent);
        self
    }

    /// Set the memory share.
    #[must_use]
    pub const fn with_mem_percent(mut self, percent: u32) -> Self {
        self.max_mem_percent = Some(percent);
        self
    }

    /// Set the concurrency ceiling.
    #[must_use]
    pub const fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = Some(max_concurrency);
        self
    }

    pub(crate) fn cpu_percent(&self) -> Option<u32> {
        self.max_cpu_percent.filter(|v| *v > 0)
    }

    pub(crate) fn mem_percent(&self) -> Option<u32> {
        self.max_mem_percent.filter(|v| *v > 0)
    }

    pub(crate) fn concurrency(&self) -> Option<usize> {
        self.max_concurrency.filter(|v| *v > 0)
    }

    /// Reject percentages above 100 before anything is mutated.
    pub fn validate(&self) -> Result<(), AdmissionError> {
        if let Some(p) = self.cpu_percent() {
            check_percent("max_cpu_percent", p)?;
        }
        if let Some(p) = self.mem_percent() {
            check_percent("max_mem_percent", p)?;
        }
        Ok(())
    }

    /// True if no field would change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cpu_percent().is_none() && self.mem_percent().is_none() && self.concurrency().is_none()
    }
}

fn check_percent(field: &str, value: u32) -> Result<(), AdmissionError> {
    if value > 100 {
        return Err(AdmissionError::InvalidConfig(format!(
            "{field} must be within 0..=100, got {value}"
        )));
    }
    Ok(())
}
