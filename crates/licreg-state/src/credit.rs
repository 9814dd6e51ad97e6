//! # CE Credit Verification
//!
//! A continuing-education credit is submitted unverified and may be
//! verified exactly once. Verification never reverses: there is no edge
//! back to [`CreditVerification::Unverified`], and a second verification
//! leaves the first verifier in place.

use serde::{Deserialize, Serialize};

use licreg_core::{CreditId, LedgerTime, Principal, Profession};

/// Verification state of a CE credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CreditVerification {
    /// Submitted, not yet confirmed. Does not count toward compliance.
    Unverified,
    /// Confirmed by `verifier`.
    Verified {
        /// Principal that performed the verification.
        verifier: Principal,
    },
}

/// Result of a verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The credit moved from unverified to verified.
    Recorded,
    /// The credit was already verified; nothing changed.
    AlreadyVerified,
}

impl CreditVerification {
    /// Apply a verification by `verifier`.
    pub fn verify(&mut self, verifier: Principal) -> VerifyOutcome {
        match self {
            Self::Unverified => {
                *self = Self::Verified { verifier };
                VerifyOutcome::Recorded
            }
            Self::Verified { .. } => VerifyOutcome::AlreadyVerified,
        }
    }

    /// Whether the credit has been verified.
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    /// The verifier, if verified.
    pub fn verifier(&self) -> Option<&Principal> {
        match self {
            Self::Unverified => None,
            Self::Verified { verifier } => Some(verifier),
        }
    }
}

/// CE hours earned by a professional toward a profession's requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeCredit {
    /// Ledger-allocated identifier.
    pub id: CreditId,
    /// The professional who earned the hours.
    pub professional_id: Principal,
    /// The profession the hours count toward.
    pub profession: Profession,
    /// Credit hours; always positive.
    pub hours: u64,
    /// When the hours were earned.
    pub earned_date: LedgerTime,
    /// Verification state.
    pub verification: CreditVerification,
}

impl CeCredit {
    /// Create a newly submitted, unverified credit.
    pub fn submitted(
        id: CreditId,
        professional_id: Principal,
        profession: Profession,
        hours: u64,
        earned_date: LedgerTime,
    ) -> Self {
        Self {
            id,
            professional_id,
            profession,
            hours,
            earned_date,
            verification: CreditVerification::Unverified,
        }
    }

    /// Whether the credit has been verified.
    pub fn is_verified(&self) -> bool {
        self.verification.is_verified()
    }

    /// The verifier, if verified.
    pub fn verifier(&self) -> Option<&Principal> {
        self.verification.verifier()
    }

    /// Whether this credit belongs to `(professional_id, profession)`.
    pub fn belongs_to(&self, professional_id: &Principal, profession: &Profession) -> bool {
        &self.professional_id == professional_id && &self.profession == profession
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(s: &str) -> Principal {
        Principal::new(s).unwrap()
    }

    fn make_credit() -> CeCredit {
        CeCredit::submitted(
            CreditId::from_sequence(1),
            principal("ST2PROFESSIONAL"),
            Profession::new("Medical Doctor").unwrap(),
            12,
            LedgerTime::new(150_000),
        )
    }

    #[test]
    fn submitted_credit_is_unverified() {
        let credit = make_credit();
        assert!(!credit.is_verified());
        assert!(credit.verifier().is_none());
    }

    #[test]
    fn verify_records_verifier() {
        let mut credit = make_credit();
        let outcome = credit.verification.verify(principal("ST1ADMIN"));
        assert_eq!(outcome, VerifyOutcome::Recorded);
        assert!(credit.is_verified());
        assert_eq!(credit.verifier(), Some(&principal("ST1ADMIN")));
    }

    #[test]
    fn second_verification_keeps_first_verifier() {
        let mut credit = make_credit();
        credit.verification.verify(principal("ST1ADMIN"));
        let outcome = credit.verification.verify(principal("ST1OTHER"));
        assert_eq!(outcome, VerifyOutcome::AlreadyVerified);
        assert_eq!(credit.verifier(), Some(&principal("ST1ADMIN")));
    }

    #[test]
    fn belongs_to_matches_both_keys() {
        let credit = make_credit();
        let doctor = Profession::new("Medical Doctor").unwrap();
        let nurse = Profession::new("Nurse").unwrap();
        assert!(credit.belongs_to(&principal("ST2PROFESSIONAL"), &doctor));
        assert!(!credit.belongs_to(&principal("ST2PROFESSIONAL"), &nurse));
        assert!(!credit.belongs_to(&principal("ST2SOMEONEELSE"), &doctor));
    }

    #[test]
    fn verification_serialization_is_tagged() {
        let mut credit = make_credit();
        let json = serde_json::to_value(&credit).unwrap();
        assert_eq!(json["verification"]["state"], "unverified");

        credit.verification.verify(principal("ST1ADMIN"));
        let json = serde_json::to_value(&credit).unwrap();
        assert_eq!(json["verification"]["state"], "verified");
        assert_eq!(json["verification"]["verifier"], "ST1ADMIN");
        let parsed: CeCredit = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, credit);
    }
}
