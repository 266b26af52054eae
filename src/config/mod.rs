//! Configuration models for pools and system totals.

pub mod pool;

pub use pool::{ManagerConfig, PoolConfig, TOTAL_CPU_ENV, TOTAL_MEM_ENV};
