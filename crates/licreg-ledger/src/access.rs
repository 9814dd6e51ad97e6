//! # Access Guard
//!
//! A single authorization seam invoked at the top of every mutating
//! operation. Operations never compare principals themselves; they ask an
//! [`AccessPolicy`], so roles can be widened (several admins, delegated
//! verifiers) by swapping the policy without touching operation bodies.
//!
//! The guard is a pure predicate. A rejection has no side effects beyond a
//! `warn!` event.

use serde::{Deserialize, Serialize};

use licreg_core::Principal;

use crate::error::LedgerError;

/// Decides whether a caller may perform privileged operations.
pub trait AccessPolicy {
    /// Whether `caller` may perform admin operations.
    fn authorize(&self, caller: &Principal) -> bool;

    /// Whether `caller` may submit a record on behalf of `subject`.
    ///
    /// Subjects may always act for themselves; anyone passing
    /// [`AccessPolicy::authorize`] may act for anyone.
    fn authorize_submission(&self, caller: &Principal, subject: &Principal) -> bool {
        caller == subject || self.authorize(caller)
    }
}

/// The shipped policy: exactly one admin principal, supplied at
/// initialization and replaceable only through guarded rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPolicy {
    admin: Principal,
}

impl AdminPolicy {
    /// Create a policy with `admin` as the sole admin.
    pub fn new(admin: Principal) -> Self {
        Self { admin }
    }

    /// The current admin principal.
    pub fn admin(&self) -> &Principal {
        &self.admin
    }

    /// Replace the admin. Callers must have passed the guard already.
    pub(crate) fn rotate(&mut self, new_admin: Principal) -> Principal {
        std::mem::replace(&mut self.admin, new_admin)
    }
}

impl AccessPolicy for AdminPolicy {
    fn authorize(&self, caller: &Principal) -> bool {
        caller == &self.admin
    }
}

/// Run the admin guard for `operation`.
pub(crate) fn require_admin(
    policy: &dyn AccessPolicy,
    caller: &Principal,
    operation: &'static str,
) -> Result<(), LedgerError> {
    if policy.authorize(caller) {
        Ok(())
    } else {
        Err(reject(caller, operation))
    }
}

/// Run the submission guard for `operation` on behalf of `subject`.
pub(crate) fn require_submitter(
    policy: &dyn AccessPolicy,
    caller: &Principal,
    subject: &Principal,
    operation: &'static str,
) -> Result<(), LedgerError> {
    if policy.authorize_submission(caller, subject) {
        Ok(())
    } else {
        Err(reject(caller, operation))
    }
}

fn reject(caller: &Principal, operation: &'static str) -> LedgerError {
    tracing::warn!(caller = %caller, operation, "access guard rejected caller");
    LedgerError::Unauthorized {
        caller: caller.clone(),
        operation,
    }
}
