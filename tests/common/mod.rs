//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use admission_pools::core::{Query, QueryExecutor};
use async_trait::async_trait;
use tokio::sync::Semaphore;

/// Executor that parks every query until the test hands out a release.
#[derive(Clone)]
pub struct HoldExecutor {
    release: Arc<Semaphore>,
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
}

impl HoldExecutor {
    pub fn new() -> Self {
        Self {
            release: Arc::new(Semaphore::new(0)),
            running: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            started: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Let `n` parked queries finish.
    pub fn release(&self, n: usize) {
        self.release.add_permits(n);
    }

    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryExecutor for HoldExecutor {
    async fn execute(&self, _query: &Query) {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let permit = self.release.acquire().await.expect("semaphore closed");
        permit.forget();
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Poll `cond` until it holds or two seconds pass.
pub async fn wait_for(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within 2s"
        );
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

/// Give spawned tasks a chance to run, for asserting that something did NOT happen.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(30)).await;
}
