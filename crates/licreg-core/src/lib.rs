#![deny(missing_docs)]

//! # licreg-core: Foundational Types for the License Registry
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies, only `serde` and `thiserror`
//! from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A [`Principal`] is not a
//!    [`Profession`], and a [`LicenseId`] cannot be passed where a
//!    [`CreditId`] is expected.
//!
//! 2. **Validation at construction.** String-based primitives reject
//!    malformed input in `new()`; once constructed they are valid for the
//!    lifetime of the value.
//!
//! 3. **No wall clock.** [`LedgerTime`] is supplied by the execution host on
//!    every call. Nothing in the core reads the system time, so replaying the
//!    same operations always produces the same ledger.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `licreg-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::ValidationError;
pub use identity::{CreditId, LicenseId, Principal, Profession};
pub use temporal::LedgerTime;
