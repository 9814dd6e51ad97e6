//! # Ledger Errors
//!
//! The four-way failure taxonomy of the ledger. Each variant maps to a
//! stable wire code that external callers can rely on across releases:
//!
//! | Variant | Code |
//! |---------|------|
//! | [`LedgerError::Unauthorized`] | `u1` |
//! | [`LedgerError::NotFound`] | `u2` |
//! | [`LedgerError::InvalidArgument`] | `u3` |
//! | [`LedgerError::InvalidTransition`] | `u4` |

use thiserror::Error;

use licreg_core::{Principal, ValidationError};
use licreg_state::LicenseError;

/// Error returned by every fallible ledger operation.
///
/// A returned error guarantees that no ledger state was modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The caller failed the access guard.
    #[error("unauthorized: {caller} may not {operation}")]
    Unauthorized {
        /// The rejected caller.
        caller: Principal,
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// The referenced record or profession does not exist.
    #[error("not found: {kind} {id}")]
    NotFound {
        /// What kind of record was looked up.
        kind: &'static str,
        /// The identifier that was not found.
        id: String,
    },

    /// An input violated a constraint.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A license status change that is not an edge of the state machine.
    #[error(transparent)]
    InvalidTransition(#[from] LicenseError),
}

impl LedgerError {
    /// The stable wire code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "u1",
            Self::NotFound { .. } => "u2",
            Self::InvalidArgument(_) => "u3",
            Self::InvalidTransition(_) => "u4",
        }
    }

    pub(crate) fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
