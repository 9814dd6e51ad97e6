//! # Shared Ledger
//!
//! A thread-safe handle for hosts that are not inherently serializing.
//!
//! Every mutating operation runs under the exclusive side of one global
//! `parking_lot::RwLock`, so read-validate-write is a single critical
//! section and mutations are applied in a total order. Reads share the lock
//! and always observe a state between two complete operations.
//!
//! The lock is never held across an `.await`; closures passed to
//! [`SharedLedger::apply`] and [`SharedLedger::read`] are synchronous.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::access::{AccessPolicy, AdminPolicy};
use crate::ledger::Ledger;

/// Cloneable, thread-safe handle to a [`Ledger`].
#[derive(Debug)]
pub struct SharedLedger<P = AdminPolicy> {
    inner: Arc<RwLock<Ledger<P>>>,
}

impl<P> Clone for SharedLedger<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: AccessPolicy> SharedLedger<P> {
    /// Share `ledger`.
    pub fn new(ledger: Ledger<P>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Run one operation with exclusive access.
    pub fn apply<R>(&self, f: impl FnOnce(&mut Ledger<P>) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Run a read-only query.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger<P>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Whether a reader gets in within `patience`.
    ///
    /// Concurrent readers never make the ledger unavailable; only a writer
    /// holding the lock for longer than `patience` does. Blocks the calling
    /// thread for at most `patience`.
    pub fn is_available(&self, patience: Duration) -> bool {
        self.inner.try_read_for(patience).is_some()
    }
}

impl<P: AccessPolicy + Clone> SharedLedger<P> {
    /// Copy of the current ledger state, for host-side persistence.
    pub fn snapshot(&self) -> Ledger<P> {
        self.inner.read().clone()
    }
}
