//! # licreg-ledger: License Registry and CE Compliance Ledger
//!
//! The deterministic core of the system. It records who holds a
//! professional license, tracks continuing-education (CE) credits earned
//! toward keeping it, and answers whether a professional currently meets
//! their profession's CE policy.
//!
//! ## Components (leaf-first)
//!
//! | Module | Component | Stored state |
//! |--------|-----------|--------------|
//! | [`access`] | Access guard ([`AccessPolicy`], [`AdminPolicy`]) | admin principal |
//! | [`policy`] | Profession CE policy store | `Profession → CePolicy` |
//! | [`credits`] | CE credit ledger | `CreditId → CeCredit` |
//! | [`registry`] | License registry | `LicenseId → License` |
//! | [`compliance`] | Compliance evaluator | none (derived) |
//!
//! [`Ledger`] composes them into the public call surface.
//!
//! ## Execution Model
//!
//! The ledger assumes a serializing host: operations are applied one at a
//! time in a total order. Every mutating operation authorizes the caller
//! and validates all inputs *before* its first write, so a failed call is
//! always a no-op and can be resubmitted safely. Hosts that are not
//! inherently serializing wrap the ledger in [`SharedLedger`], whose
//! exclusive lock spans read-validate-write.
//!
//! ## Crate Policy
//!
//! - No wall-clock reads, no randomness: identical inputs yield identical
//!   ledgers.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Records are never physically removed.

pub mod access;
pub mod compliance;
pub mod credits;
pub mod error;
pub mod ledger;
pub mod policy;
pub mod registry;
pub mod shared;

pub use access::{AccessPolicy, AdminPolicy};
pub use compliance::{ComplianceEvaluator, ComplianceReport, ComplianceWindow};
pub use credits::CreditLedger;
pub use error::LedgerError;
pub use ledger::{Ledger, LedgerConfig};
pub use policy::{CePolicy, PolicyStore};
pub use registry::{DuplicateLicensePolicy, LicenseRegistry, LicenseUpdate};
pub use shared::SharedLedger;
