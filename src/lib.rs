//! # Admission Pools
//!
//! Admission control for concurrent query workloads.
//!
//! A [`PoolManager`](core::PoolManager) keeps a registry of named
//! [`ResourcePool`](core::ResourcePool)s. Each pool owns a share of the
//! system's CPU and memory and a ceiling on how many queries it admits at
//! once. Submitting a query either admits it (reserving its resources for
//! the run) or rejects it immediately; nothing is queued on resource
//! grounds.
//!
//! ## Key Features
//!
//! - **Two-stage admission**: a concurrency token first, then a CPU/memory
//!   check against the pool's computed limits
//! - **Live resize**: the concurrency ceiling can grow or shrink while
//!   queries are in flight; held tokens are never revoked
//! - **Safe removal**: a busy pool reports that it is still draining instead
//!   of cutting off admitted work
//! - **Consistent snapshots**: each pool is copied under a single lock
//!   acquisition
//!
//! ```rust,ignore
//! use admission_pools::core::{PoolLimits, PoolManager, Query, QueryOutcome, SystemTotals};
//!
//! let manager = PoolManager::new(SystemTotals::default());
//! manager.create_pool("reports", PoolLimits::new(60, 65, 2))?;
//!
//! let outcome = manager.submit_query_to_pool("reports", Query::new(10, 20)).await;
//! assert_eq!(outcome, QueryOutcome::Completed);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Admission control: pools, gate, registry.
pub mod core;
/// Configuration models for pools and system totals.
pub mod config;
/// Builders to construct managers from configuration.
pub mod builders;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
