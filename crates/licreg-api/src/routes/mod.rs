//! # API Route Modules
//!
//! - `licenses`: license issuance, lookup, info updates, status changes,
//!   and the lapse sweep.
//! - `professions`: per-profession CE requirements.
//! - `credits`: CE credit submission, lookup, and verification.
//! - `compliance`: CE compliance evaluation.
//! - `admin`: admin lookup and rotation.

pub mod admin;
pub mod compliance;
pub mod credits;
pub mod licenses;
pub mod professions;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Acknowledgement of a successful mutation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Ack {
    pub ok: bool,
}
