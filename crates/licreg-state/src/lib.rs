//! # licreg-state: Registry State Machines
//!
//! Closed tagged-state enumerations for the two mutable records of the
//! registry. Every legal move is listed in one place, so illegal moves are
//! a single exhaustively-tested surface rather than conditionals spread
//! across call sites.
//!
//! ## State Machines
//!
//! - **License** (`license.rs`): `Active ⇄ Suspended`, with `Revoked` and
//!   `Expired` as terminal states. The edge table is
//!   [`LicenseStatus::TRANSITIONS`].
//!
//! - **Credit verification** (`credit.rs`): `Unverified → Verified`, one
//!   way. Re-verification is a recorded no-op that keeps the first
//!   verifier.
//!
//! Records here carry no authorization logic; the ledger guards every call
//! that reaches them.

pub mod credit;
pub mod license;

// ─── License re-exports ─────────────────────────────────────────────

pub use license::{License, LicenseError, LicenseStatus, StatusTransition};

// ─── Credit re-exports ──────────────────────────────────────────────

pub use credit::{CeCredit, CreditVerification, VerifyOutcome};
