//! # Ledger Time
//!
//! Defines [`LedgerTime`], a point on the execution host's ordered clock.
//!
//! The registry runs as a deterministic state machine: it never reads a
//! wall clock. Every date (issue, expiry, credit earned, compliance
//! as-of) is supplied by the caller in the host's unit: a block height on
//! a chain host, epoch seconds elsewhere. CE cycle lengths are expressed in
//! the same unit.

use serde::{Deserialize, Serialize};

/// A point on the host's ordered clock.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LedgerTime(u64);

impl LedgerTime {
    /// The origin of the ledger clock.
    pub const ZERO: Self = Self(0);

    /// Create a ledger time from its raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw clock value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Step back by `len` units, stopping at [`LedgerTime::ZERO`].
    pub const fn saturating_sub(self, len: u64) -> Self {
        Self(self.0.saturating_sub(len))
    }
}

impl From<u64> for LedgerTime {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for LedgerTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
