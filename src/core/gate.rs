//! Counting admission gate with a resizable capacity.
//!
//! The gate holds no lock of its own. It lives inside the pool's counter
//! lock, so acquire, release, resize and retire are serialized with the
//! resource counters. Waiting happens outside the lock in
//! [`ResourcePool`](crate::core::ResourcePool).

/// Result of a single non-blocking acquire attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAcquire {
    /// A token was taken.
    Acquired,
    /// Gate is at capacity; wait for a release or resize.
    Full,
    /// Gate was retired; no further admissions.
    Retired,
}

/// Capacity plus held-token counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcurrencyGate {
    capacity: usize,
    held: usize,
    retired: bool,
}

impl ConcurrencyGate {
    /// Create an open gate.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            held: 0,
            retired: false,
        }
    }

    /// Take a token if one is free.
    pub fn try_acquire(&mut self) -> GateAcquire {
        if self.retired {
            return GateAcquire::Retired;
        }
        if self.held < self.capacity {
            self.held += 1;
            GateAcquire::Acquired
        } else {
            GateAcquire::Full
        }
    }

    /// Return a token.
    ///
    /// Returns true when a waiter could now make progress.
    pub fn release(&mut self) -> bool {
        debug_assert!(self.held > 0, "gate release without a held token");
        self.held = self.held.saturating_sub(1);
        self.held < self.capacity
    }

    /// Change the capacity. Held tokens are never revoked; shrinking below
    /// `held` just makes new acquires wait until enough tokens return.
    ///
    /// Returns true when the gate grew, so waiters should re-check.
    pub fn resize(&mut self, capacity: usize) -> bool {
        let grew = capacity > self.capacity;
        self.capacity = capacity;
        grew
    }

    /// Close the gate for good.
    pub fn retire(&mut self) {
        self.retired = true;
    }

    /// Configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Outstanding tokens.
    #[must_use]
    pub const fn held(&self) -> usize {
        self.held
    }

    /// Whether the gate has been retired.
    #[must_use]
    pub const fn is_retired(&self) -> bool {
        self.retired
    }
}
