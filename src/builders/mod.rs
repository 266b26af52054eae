//! Builders to construct managers from configuration.

pub mod pool_builder;

pub use pool_builder::build_manager;
