//! API-facing request/response models for an admin or submission surface.

use serde::{Deserialize, Serialize};

use crate::core::{AdmissionError, PoolManager, PoolUpdate, PoolView, Query, QueryId, QueryOutcome};

/// Query submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Target pool.
    pub pool: String,
    /// Query to run.
    pub query: Query,
}

/// Query submission result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Query identifier.
    pub query_id: QueryId,
    /// Outcome classification.
    pub outcome: QueryOutcome,
}

/// Pool alteration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlterRequest {
    /// Pool to alter.
    pub pool: String,
    /// Fields to change.
    #[serde(flatten)]
    pub update: PoolUpdate,
}

/// Alteration or removal result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    /// Whether the change was applied.
    pub applied: bool,
    /// Reason when not applied.
    pub reason: Option<String>,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Registered pools.
    pub pools: usize,
}

/// Submit a query and wait for its outcome.
pub async fn submit(manager: &PoolManager, req: SubmitRequest) -> SubmitResponse {
    let query_id = req.query.id.clone();
    let outcome = manager.submit_query_to_pool(&req.pool, req.query).await;
    SubmitResponse { query_id, outcome }
}

/// Apply an alteration request.
pub fn alter(manager: &PoolManager, req: &AlterRequest) -> AdminResponse {
    admin_response(&req.pool, manager.alter_pool(&req.pool, &req.update))
}

/// Remove a pool if it is idle.
pub fn drop_pool(manager: &PoolManager, pool: &str) -> AdminResponse {
    admin_response(pool, manager.drop_pool(pool))
}

fn admin_response(pool: &str, result: Result<bool, AdmissionError>) -> AdminResponse {
    let result = result.and_then(|found| {
        if found {
            Ok(())
        } else {
            Err(AdmissionError::NoSuchPool(pool.to_string()))
        }
    });
    match result {
        Ok(()) => AdminResponse {
            applied: true,
            reason: None,
        },
        Err(e) => AdminResponse {
            applied: false,
            reason: Some(e.to_string()),
        },
    }
}

/// Current view of every pool.
pub fn list_pools(manager: &PoolManager) -> Vec<PoolView> {
    manager.snapshot_pools()
}

/// Return a health payload.
pub fn health(manager: &PoolManager) -> Health {
    Health {
        ok: true,
        pools: manager.len(),
    }
}
