//! # CE Credit Ledger
//!
//! Records of continuing-education hours, keyed by ledger-allocated
//! [`CreditId`]. A credit is created unverified, may be verified once by an
//! admin, and is never deleted.
//!
//! Submission is open to the professional the hours belong to and to the
//! admin. Unverified hours never count toward compliance, so
//! self-submission cannot inflate a compliance answer on its own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use licreg_core::{CreditId, LedgerTime, Principal, Profession};
use licreg_state::{CeCredit, VerifyOutcome};

use crate::access::{require_admin, require_submitter, AccessPolicy};
use crate::error::LedgerError;

/// Table of CE credits keyed by allocation sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CreditRecord")]
pub struct CreditLedger {
    credits: BTreeMap<u64, CeCredit>,
    last_sequence: u64,
}

/// Unchecked wire form of a [`CreditLedger`].
#[derive(Deserialize)]
struct CreditRecord {
    credits: BTreeMap<u64, CeCredit>,
    last_sequence: u64,
}

impl TryFrom<CreditRecord> for CreditLedger {
    type Error = LedgerError;

    fn try_from(record: CreditRecord) -> Result<Self, Self::Error> {
        for (sequence, credit) in &record.credits {
            if credit.id.sequence() != Some(*sequence) {
                return Err(LedgerError::invalid(format!(
                    "credit {} stored under sequence {sequence}",
                    credit.id
                )));
            }
            if credit.hours == 0 {
                return Err(LedgerError::invalid(format!(
                    "credit {} has zero hours",
                    credit.id
                )));
            }
        }
        let highest = record.credits.keys().next_back().copied().unwrap_or(0);
        Ok(Self {
            last_sequence: record.last_sequence.max(highest),
            credits: record.credits,
        })
    }
}

impl CreditLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `hours` of CE earned by `professional_id` at `earned_date`.
    ///
    /// The caller must be the professional or the admin. `hours` must be
    /// positive. The new credit starts unverified.
    pub fn add(
        &mut self,
        guard: &dyn AccessPolicy,
        caller: &Principal,
        professional_id: Principal,
        profession: Profession,
        hours: u64,
        earned_date: LedgerTime,
    ) -> Result<CreditId, LedgerError> {
        require_submitter(guard, caller, &professional_id, "add_ce_credit")?;
        if hours == 0 {
            return Err(LedgerError::invalid("credit hours must be positive"));
        }
        let sequence = self
            .last_sequence
            .checked_add(1)
            .ok_or_else(|| LedgerError::invalid("credit identifier space exhausted"))?;

        let id = CreditId::from_sequence(sequence);
        let credit = CeCredit::submitted(
            id.clone(),
            professional_id,
            profession,
            hours,
            earned_date,
        );
        tracing::info!(
            credit_id = %id,
            professional_id = %credit.professional_id,
            profession = %credit.profession,
            hours,
            earned_date = %earned_date,
            submitted_by = %caller,
            "CE credit added"
        );
        self.credits.insert(sequence, credit);
        self.last_sequence = sequence;
        Ok(id)
    }

    /// Mark a credit verified by `caller`. Admin only.
    ///
    /// Verifying an already-verified credit succeeds without changing it;
    /// the first verifier stays on record.
    pub fn verify(
        &mut self,
        guard: &dyn AccessPolicy,
        caller: &Principal,
        id: &CreditId,
    ) -> Result<bool, LedgerError> {
        require_admin(guard, caller, "verify_ce_credit")?;
        let credit = id
            .sequence()
            .and_then(|seq| self.credits.get_mut(&seq))
            .ok_or_else(|| LedgerError::not_found("credit", id))?;

        match credit.verification.verify(caller.clone()) {
            VerifyOutcome::Recorded => {
                tracing::info!(credit_id = %id, verifier = %caller, "CE credit verified");
            }
            VerifyOutcome::AlreadyVerified => {
                tracing::debug!(credit_id = %id, "CE credit already verified");
            }
        }
        Ok(true)
    }

    /// Look up a credit.
    pub fn get(&self, id: &CreditId) -> Result<&CeCredit, LedgerError> {
        id.sequence()
            .and_then(|seq| self.credits.get(&seq))
            .ok_or_else(|| LedgerError::not_found("credit", id))
    }

    /// All credits of `(professional_id, profession)`, verified or not, in
    /// submission order.
    pub fn credits_for<'a>(
        &'a self,
        professional_id: &'a Principal,
        profession: &'a Profession,
    ) -> impl Iterator<Item = &'a CeCredit> + 'a {
        self.credits
            .values()
            .filter(move |c| c.belongs_to(professional_id, profession))
    }

    /// Number of credits recorded.
    pub fn len(&self) -> usize {
        self.credits.len()
    }

    /// Whether no credit has been recorded.
    pub fn is_empty(&self) -> bool {
        self.credits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AdminPolicy;

    fn principal(s: &str) -> Principal {
        Principal::new(s).unwrap()
    }

    fn doctor() -> Profession {
        Profession::new("Medical Doctor").unwrap()
    }

    fn guard() -> AdminPolicy {
        AdminPolicy::new(principal("ST1ADMIN"))
    }

    fn add(ledger: &mut CreditLedger, caller: &str, hours: u64) -> Result<CreditId, LedgerError> {
        ledger.add(
            &guard(),
            &principal(caller),
            principal("ST2PRO"),
            doctor(),
            hours,
            LedgerTime::new(150_000),
        )
    }

    #[test]
    fn add_then_get_roundtrip() {
        let mut ledger = CreditLedger::new();
        let id = add(&mut ledger, "ST1ADMIN", 12).unwrap();
        assert_eq!(id.as_str(), "credit-1");
        let credit = ledger.get(&id).unwrap();
        assert_eq!(credit.hours, 12);
        assert_eq!(credit.earned_date, LedgerTime::new(150_000));
        assert_eq!(credit.professional_id, principal("ST2PRO"));
        assert!(!credit.is_verified());
    }

    #[test]
    fn professional_may_self_submit() {
        let mut ledger = CreditLedger::new();
        assert!(add(&mut ledger, "ST2PRO", 5).is_ok());
    }

    #[test]
    fn third_party_submission_rejected() {
        let mut ledger = CreditLedger::new();
        let err = add(&mut ledger, "ST3STRANGER", 5).unwrap_err();
        assert_eq!(err.code(), "u1");
        assert!(ledger.is_empty());
    }

    #[test]
    fn zero_hours_rejected_without_allocating() {
        let mut ledger = CreditLedger::new();
        assert_eq!(add(&mut ledger, "ST1ADMIN", 0).unwrap_err().code(), "u3");
        let id = add(&mut ledger, "ST1ADMIN", 1).unwrap();
        assert_eq!(id.as_str(), "credit-1");
    }

    #[test]
    fn verify_is_admin_only() {
        let mut ledger = CreditLedger::new();
        let id = add(&mut ledger, "ST2PRO", 10).unwrap();
        let err = ledger.verify(&guard(), &principal("ST2PRO"), &id).unwrap_err();
        assert_eq!(err.code(), "u1");
        assert!(!ledger.get(&id).unwrap().is_verified());
    }

    #[test]
    fn verify_is_idempotent() {
        let mut ledger = CreditLedger::new();
        let id = add(&mut ledger, "ST2PRO", 10).unwrap();
        assert!(ledger.verify(&guard(), &principal("ST1ADMIN"), &id).unwrap());
        assert!(ledger.verify(&guard(), &principal("ST1ADMIN"), &id).unwrap());
        let credit = ledger.get(&id).unwrap();
        assert!(credit.is_verified());
        assert_eq!(credit.verifier(), Some(&principal("ST1ADMIN")));
    }

    #[test]
    fn verify_unknown_credit_is_not_found() {
        let mut ledger = CreditLedger::new();
        let missing = CreditId::new("credit-99").unwrap();
        let err = ledger
            .verify(&guard(), &principal("ST1ADMIN"), &missing)
            .unwrap_err();
        assert_eq!(err.code(), "u2");
        let opaque = CreditId::new("not-a-credit").unwrap();
        assert_eq!(ledger.get(&opaque).unwrap_err().code(), "u2");
    }

    #[test]
    fn credits_for_filters_by_professional_and_profession() {
        let mut ledger = CreditLedger::new();
        add(&mut ledger, "ST1ADMIN", 3).unwrap();
        ledger
            .add(
                &guard(),
                &principal("ST1ADMIN"),
                principal("ST2PRO"),
                Profession::new("Nurse").unwrap(),
                4,
                LedgerTime::new(1),
            )
            .unwrap();
        let pro = principal("ST2PRO");
        let doc = doctor();
        let hours: Vec<u64> = ledger.credits_for(&pro, &doc).map(|c| c.hours).collect();
        assert_eq!(hours, vec![3]);
    }

    fn restore(value: serde_json::Value) -> Result<CreditLedger, serde_json::Error> {
        serde_json::from_str(&value.to_string())
    }

    #[test]
    fn restore_rejects_key_not_matching_id() {
        let mut ledger = CreditLedger::new();
        add(&mut ledger, "ST2PRO", 4).unwrap();
        let mut value = serde_json::to_value(&ledger).unwrap();
        let credits = value["credits"].as_object_mut().unwrap();
        let credit = credits.remove("1").unwrap();
        credits.insert("3".to_string(), credit);
        let err = restore(value).unwrap_err();
        assert!(err.to_string().contains("stored under sequence 3"));
    }

    #[test]
    fn restore_rejects_zero_hours() {
        let mut ledger = CreditLedger::new();
        add(&mut ledger, "ST2PRO", 4).unwrap();
        let mut value = serde_json::to_value(&ledger).unwrap();
        value["credits"]["1"]["hours"] = serde_json::json!(0);
        assert!(restore(value).is_err());
    }

    #[test]
    fn restore_raises_stale_sequence() {
        let mut ledger = CreditLedger::new();
        let first = add(&mut ledger, "ST2PRO", 4).unwrap();
        let mut value = serde_json::to_value(&ledger).unwrap();
        value["last_sequence"] = serde_json::json!(0);
        let mut restored = restore(value).unwrap();

        let next = add(&mut restored, "ST2PRO", 9).unwrap();
        assert_eq!(next.as_str(), "credit-2");
        assert_eq!(restored.get(&first).unwrap().hours, 4);
        assert_eq!(restored.len(), 2);
    }
}
