//! # License Status State Machine
//!
//! Models the lifecycle of a professional license from issuance until it
//! is revoked or lapses.
//!
//! ## States
//!
//! ```text
//! issue ──▶ Active ──▶ Suspended ──▶ Active (reinstatement)
//!             │  │          │
//!             │  │          └──▶ Revoked (terminal)
//!             │  └──▶ Revoked (terminal)
//!             └──▶ Expired (terminal)
//! ```
//!
//! Licenses are never deleted. A revoked or expired license stays in the
//! registry with its full transition history.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use licreg_core::{LedgerTime, LicenseId, Principal, Profession};

// ─── License Status ──────────────────────────────────────────────────

/// The lifecycle status of a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// License is in good standing.
    Active,
    /// License has been temporarily suspended.
    Suspended,
    /// License has been permanently revoked (terminal).
    Revoked,
    /// License term has ended (terminal).
    Expired,
}

impl LicenseStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [Self::Active, Self::Suspended, Self::Revoked, Self::Expired];

    /// The complete edge set of the state machine. Any pair not listed
    /// here is an invalid transition.
    pub const TRANSITIONS: [(Self, Self); 5] = [
        (Self::Active, Self::Suspended),
        (Self::Active, Self::Revoked),
        (Self::Active, Self::Expired),
        (Self::Suspended, Self::Active),
        (Self::Suspended, Self::Revoked),
    ];

    /// Whether `self → to` is an edge of the state machine.
    pub fn can_transition_to(self, to: Self) -> bool {
        Self::TRANSITIONS.contains(&(self, to))
    }

    /// Whether this status has no outgoing edges.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Revoked | Self::Expired)
    }

    /// Whether the license is still held (active or suspended).
    pub fn is_live(self) -> bool {
        !self.is_terminal()
    }

    /// Return the string representation of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Revoked => "revoked",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LicenseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "revoked" => Ok(Self::Revoked),
            "expired" => Ok(Self::Expired),
            other => Err(format!("unknown license status: {other}")),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors that can occur during license status transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LicenseError {
    /// Attempted transition is not an edge of the state machine.
    #[error("invalid license transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: LicenseStatus,
        /// Attempted target status.
        to: LicenseStatus,
    },

    /// License is in a terminal status and admits no transitions.
    #[error("license is in terminal status {status}")]
    TerminalState {
        /// The terminal status.
        status: LicenseStatus,
    },
}

// ─── Transition History ──────────────────────────────────────────────

/// Record of a license status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    /// Status before the transition.
    pub from: LicenseStatus,
    /// Status after the transition.
    pub to: LicenseStatus,
    /// Principal that requested the transition.
    pub actor: Principal,
}

// ─── License ─────────────────────────────────────────────────────────

/// A professional license with its status and transition history.
///
/// Invariant: `expiry_date > issue_date`. The registry checks it on
/// issuance and on every expiry update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// Ledger-allocated identifier.
    pub id: LicenseId,
    /// The professional holding this license.
    pub professional_id: Principal,
    /// The profession this license permits practicing.
    pub profession: Profession,
    /// When the license was issued.
    pub issue_date: LedgerTime,
    /// When the license term ends.
    pub expiry_date: LedgerTime,
    /// Current lifecycle status.
    pub status: LicenseStatus,
    /// Ordered log of all status transitions.
    #[serde(default)]
    pub transitions: Vec<StatusTransition>,
}

impl License {
    /// Create a freshly issued license in [`LicenseStatus::Active`].
    pub fn issued(
        id: LicenseId,
        professional_id: Principal,
        profession: Profession,
        issue_date: LedgerTime,
        expiry_date: LedgerTime,
    ) -> Self {
        Self {
            id,
            professional_id,
            profession,
            issue_date,
            expiry_date,
            status: LicenseStatus::Active,
            transitions: Vec::new(),
        }
    }

    /// Check that `self.status → to` is legal without applying it.
    pub fn check_transition(&self, to: LicenseStatus) -> Result<(), LicenseError> {
        if self.status.is_terminal() {
            return Err(LicenseError::TerminalState {
                status: self.status,
            });
        }
        if !self.status.can_transition_to(to) {
            return Err(LicenseError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        Ok(())
    }

    /// Move to `to`, recording the transition. On error nothing changes.
    pub fn transition(&mut self, to: LicenseStatus, actor: Principal) -> Result<(), LicenseError> {
        self.check_transition(to)?;
        self.transitions.push(StatusTransition {
            from: self.status,
            to,
            actor,
        });
        self.status = to;
        Ok(())
    }

    /// Whether the license is still held (active or suspended).
    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    /// Whether the license is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the term has run out at `as_of`.
    pub fn has_lapsed(&self, as_of: LedgerTime) -> bool {
        self.expiry_date <= as_of
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Principal {
        Principal::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM").unwrap()
    }

    fn make_license() -> License {
        License::issued(
            LicenseId::from_sequence(1),
            Principal::new("ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG").unwrap(),
            Profession::new("Medical Doctor").unwrap(),
            LedgerTime::new(100_000),
            LedgerTime::new(200_000),
        )
    }

    // ── Happy-path lifecycle tests ───────────────────────────────────

    #[test]
    fn test_issued_license_is_active() {
        let lic = make_license();
        assert_eq!(lic.status, LicenseStatus::Active);
        assert!(lic.is_live());
        assert!(lic.transitions.is_empty());
    }

    #[test]
    fn test_suspend_and_reinstate() {
        let mut lic = make_license();
        lic.transition(LicenseStatus::Suspended, admin()).unwrap();
        assert_eq!(lic.status, LicenseStatus::Suspended);
        assert!(lic.is_live());
        lic.transition(LicenseStatus::Active, admin()).unwrap();
        assert_eq!(lic.status, LicenseStatus::Active);
        assert_eq!(lic.transitions.len(), 2);
        assert_eq!(lic.transitions[0].from, LicenseStatus::Active);
        assert_eq!(lic.transitions[1].to, LicenseStatus::Active);
    }

    #[test]
    fn test_revoke_from_suspended() {
        let mut lic = make_license();
        lic.transition(LicenseStatus::Suspended, admin()).unwrap();
        lic.transition(LicenseStatus::Revoked, admin()).unwrap();
        assert!(lic.is_terminal());
    }

    #[test]
    fn test_expire_from_active() {
        let mut lic = make_license();
        lic.transition(LicenseStatus::Expired, admin()).unwrap();
        assert!(lic.is_terminal());
        assert_eq!(lic.transitions[0].actor, admin());
    }

    // ── Invalid transition tests ─────────────────────────────────────

    #[test]
    fn test_cannot_expire_from_suspended() {
        let mut lic = make_license();
        lic.transition(LicenseStatus::Suspended, admin()).unwrap();
        let err = lic.transition(LicenseStatus::Expired, admin()).unwrap_err();
        assert_eq!(
            err,
            LicenseError::InvalidTransition {
                from: LicenseStatus::Suspended,
                to: LicenseStatus::Expired,
            }
        );
        assert_eq!(lic.status, LicenseStatus::Suspended);
        assert_eq!(lic.transitions.len(), 1);
    }

    #[test]
    fn test_self_transition_rejected() {
        let mut lic = make_license();
        assert!(lic.transition(LicenseStatus::Active, admin()).is_err());
        assert!(lic.transitions.is_empty());
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for terminal in [LicenseStatus::Revoked, LicenseStatus::Expired] {
            for to in LicenseStatus::ALL {
                let mut lic = make_license();
                lic.transition(terminal, admin()).unwrap();
                let err = lic.transition(to, admin()).unwrap_err();
                assert_eq!(err, LicenseError::TerminalState { status: terminal });
                assert_eq!(lic.status, terminal);
            }
        }
    }

    #[test]
    fn test_transition_table_is_exhaustive() {
        let mut allowed = 0;
        for from in LicenseStatus::ALL {
            for to in LicenseStatus::ALL {
                let legal = matches!(
                    (from, to),
                    (LicenseStatus::Active, LicenseStatus::Suspended)
                        | (LicenseStatus::Active, LicenseStatus::Revoked)
                        | (LicenseStatus::Active, LicenseStatus::Expired)
                        | (LicenseStatus::Suspended, LicenseStatus::Active)
                        | (LicenseStatus::Suspended, LicenseStatus::Revoked)
                );
                assert_eq!(from.can_transition_to(to), legal, "{from} -> {to}");
                if legal {
                    allowed += 1;
                }
            }
        }
        assert_eq!(allowed, LicenseStatus::TRANSITIONS.len());
    }

    // ── Expiry tracking ──────────────────────────────────────────────

    #[test]
    fn test_has_lapsed_is_inclusive_of_expiry_date() {
        let lic = make_license();
        assert!(!lic.has_lapsed(LedgerTime::new(199_999)));
        assert!(lic.has_lapsed(LedgerTime::new(200_000)));
    }

    // ── Display / parse tests ────────────────────────────────────────

    #[test]
    fn test_license_status_display_roundtrip() {
        for status in LicenseStatus::ALL {
            assert_eq!(status.to_string().parse::<LicenseStatus>(), Ok(status));
        }
        assert!("pending".parse::<LicenseStatus>().is_err());
    }

    // ── Serialization tests ──────────────────────────────────────────

    #[test]
    fn test_license_serialization() {
        let mut lic = make_license();
        lic.transition(LicenseStatus::Suspended, admin()).unwrap();
        let json = serde_json::to_value(&lic).unwrap();
        assert_eq!(json["status"], "suspended");
        assert_eq!(json["issue_date"], 100_000);
        let parsed: License = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, lic);
    }
}
