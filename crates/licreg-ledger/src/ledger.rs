//! # Ledger
//!
//! The public call surface: one value owning the access policy and the
//! three tables, with one method per external operation.
//!
//! | Operation | Method | Guard |
//! |-----------|--------|-------|
//! | issue-license | [`Ledger::issue_license`] | admin |
//! | get-license | [`Ledger::license`] | public |
//! | update-license-info | [`Ledger::update_license_info`] | admin |
//! | set-license-status | [`Ledger::set_license_status`] | admin |
//! | set-ce-requirements | [`Ledger::set_ce_requirements`] | admin |
//! | get-ce-requirements | [`Ledger::ce_requirements`] | public |
//! | add-ce-credit | [`Ledger::add_ce_credit`] | self or admin |
//! | verify-ce-credit | [`Ledger::verify_ce_credit`] | admin |
//! | get-ce-credit | [`Ledger::ce_credit`] | public |
//! | check-ce-compliance | [`Ledger::check_ce_compliance`] | public |
//! | rotate-admin | [`Ledger::rotate_admin`] | admin |
//! | expire-lapsed | [`Ledger::expire_lapsed_licenses`] | admin |
//!
//! The ledger serializes with serde so a host can snapshot and restore it.

use serde::{Deserialize, Serialize};

use licreg_core::{CreditId, LedgerTime, LicenseId, Principal, Profession};
use licreg_state::{CeCredit, License, LicenseStatus};

use crate::access::{require_admin, require_submitter, AccessPolicy, AdminPolicy};
use crate::compliance::{ComplianceEvaluator, ComplianceReport};
use crate::credits::CreditLedger;
use crate::error::LedgerError;
use crate::policy::{CePolicy, PolicyStore};
use crate::registry::{DuplicateLicensePolicy, LicenseRegistry, LicenseUpdate};

/// Initialization parameters for a [`Ledger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// The initial admin principal.
    pub admin: Principal,
    /// How issuance treats duplicate live licenses.
    pub duplicate_licenses: DuplicateLicensePolicy,
}

impl LedgerConfig {
    /// Configuration with `admin` and default policies.
    pub fn new(admin: Principal) -> Self {
        Self {
            admin,
            duplicate_licenses: DuplicateLicensePolicy::default(),
        }
    }
}

/// License registry, CE policy store, and CE credit ledger behind one
/// access policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger<P = AdminPolicy> {
    access: P,
    licenses: LicenseRegistry,
    policies: PolicyStore,
    credits: CreditLedger,
}

impl Ledger<AdminPolicy> {
    /// Create an empty ledger administered by `config.admin`.
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_access_policy(AdminPolicy::new(config.admin), config.duplicate_licenses)
    }

    /// The current admin principal.
    pub fn admin(&self) -> &Principal {
        self.access.admin()
    }

    /// Hand administration to `new_admin`. Admin only.
    ///
    /// After rotation the previous admin is an ordinary principal.
    pub fn rotate_admin(
        &mut self,
        caller: &Principal,
        new_admin: Principal,
    ) -> Result<bool, LedgerError> {
        require_admin(&self.access, caller, "rotate_admin")?;
        let previous = self.access.rotate(new_admin);
        tracing::info!(previous = %previous, admin = %self.access.admin(), "admin rotated");
        Ok(true)
    }
}

impl<P: AccessPolicy> Ledger<P> {
    /// Create an empty ledger guarded by a custom access policy.
    pub fn with_access_policy(access: P, duplicate_licenses: DuplicateLicensePolicy) -> Self {
        Self {
            access,
            licenses: LicenseRegistry::new(duplicate_licenses),
            policies: PolicyStore::new(),
            credits: CreditLedger::new(),
        }
    }

    /// Run the admin guard for `operation` without performing it.
    ///
    /// Hosts call this before decoding a request body, so a non-admin is
    /// turned away before any argument is looked at. The operation itself
    /// still guards.
    pub fn authorize_admin(
        &self,
        caller: &Principal,
        operation: &'static str,
    ) -> Result<(), LedgerError> {
        require_admin(&self.access, caller, operation)
    }

    /// Run the submission guard for `operation` on behalf of `subject`
    /// without performing it.
    pub fn authorize_submitter(
        &self,
        caller: &Principal,
        subject: &Principal,
        operation: &'static str,
    ) -> Result<(), LedgerError> {
        require_submitter(&self.access, caller, subject, operation)
    }

    // ── License registry ─────────────────────────────────────────────

    /// issue-license.
    pub fn issue_license(
        &mut self,
        caller: &Principal,
        professional_id: Principal,
        profession: Profession,
        issue_date: LedgerTime,
        expiry_date: LedgerTime,
    ) -> Result<LicenseId, LedgerError> {
        self.licenses.issue(
            &self.access,
            caller,
            professional_id,
            profession,
            issue_date,
            expiry_date,
        )
    }

    /// get-license.
    pub fn license(&self, id: &LicenseId) -> Result<&License, LedgerError> {
        self.licenses.get(id)
    }

    /// update-license-info.
    pub fn update_license_info(
        &mut self,
        caller: &Principal,
        id: &LicenseId,
        update: LicenseUpdate,
    ) -> Result<bool, LedgerError> {
        self.licenses.update_info(&self.access, caller, id, update)
    }

    /// set-license-status.
    pub fn set_license_status(
        &mut self,
        caller: &Principal,
        id: &LicenseId,
        status: LicenseStatus,
    ) -> Result<bool, LedgerError> {
        self.licenses.set_status(&self.access, caller, id, status)
    }

    /// Expire every active license whose term has run out at `as_of`.
    pub fn expire_lapsed_licenses(
        &mut self,
        caller: &Principal,
        as_of: LedgerTime,
    ) -> Result<Vec<LicenseId>, LedgerError> {
        self.licenses.expire_lapsed(&self.access, caller, as_of)
    }

    /// Every license ever issued to `professional_id`, in issuance order.
    pub fn licenses_held_by<'a>(&'a self, professional_id: &'a Principal) -> Vec<&'a License> {
        self.licenses.held_by(professional_id).collect()
    }

    /// Number of licenses ever issued.
    pub fn license_count(&self) -> usize {
        self.licenses.len()
    }

    // ── CE policy store ──────────────────────────────────────────────

    /// set-ce-requirements.
    pub fn set_ce_requirements(
        &mut self,
        caller: &Principal,
        profession: Profession,
        required_credits: u64,
        cycle_length: u64,
    ) -> Result<bool, LedgerError> {
        self.policies.set_requirements(
            &self.access,
            caller,
            profession,
            required_credits,
            cycle_length,
        )
    }

    /// get-ce-requirements.
    pub fn ce_requirements(&self, profession: &Profession) -> Result<&CePolicy, LedgerError> {
        self.policies.get(profession)
    }

    // ── CE credit ledger ─────────────────────────────────────────────

    /// add-ce-credit.
    pub fn add_ce_credit(
        &mut self,
        caller: &Principal,
        professional_id: Principal,
        profession: Profession,
        hours: u64,
        earned_date: LedgerTime,
    ) -> Result<CreditId, LedgerError> {
        self.credits.add(
            &self.access,
            caller,
            professional_id,
            profession,
            hours,
            earned_date,
        )
    }

    /// verify-ce-credit.
    pub fn verify_ce_credit(
        &mut self,
        caller: &Principal,
        id: &CreditId,
    ) -> Result<bool, LedgerError> {
        self.credits.verify(&self.access, caller, id)
    }

    /// get-ce-credit.
    pub fn ce_credit(&self, id: &CreditId) -> Result<&CeCredit, LedgerError> {
        self.credits.get(id)
    }

    /// All credits of `(professional_id, profession)`, in submission order.
    pub fn credits_for<'a>(
        &'a self,
        professional_id: &'a Principal,
        profession: &'a Profession,
    ) -> Vec<&'a CeCredit> {
        self.credits.credits_for(professional_id, profession).collect()
    }

    /// Number of credits recorded.
    pub fn credit_count(&self) -> usize {
        self.credits.len()
    }

    // ── Compliance ───────────────────────────────────────────────────

    /// check-ce-compliance.
    pub fn check_ce_compliance(
        &self,
        professional_id: &Principal,
        profession: &Profession,
        as_of: LedgerTime,
    ) -> bool {
        self.evaluator().check(professional_id, profession, as_of)
    }

    /// check-ce-compliance, with the numbers behind the answer.
    pub fn compliance_report(
        &self,
        professional_id: &Principal,
        profession: &Profession,
        as_of: LedgerTime,
    ) -> ComplianceReport {
        self.evaluator().report(professional_id, profession, as_of)
    }

    fn evaluator(&self) -> ComplianceEvaluator<'_> {
        ComplianceEvaluator::new(&self.policies, &self.credits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(s: &str) -> Principal {
        Principal::new(s).unwrap()
    }

    fn ledger() -> Ledger {
        Ledger::new(LedgerConfig::new(principal("ST1ADMIN")))
    }

    #[test]
    fn rotation_moves_admin_rights() {
        let mut ledger = ledger();
        let old = principal("ST1ADMIN");
        let new = principal("ST1SUCCESSOR");
        assert!(ledger.rotate_admin(&old, new.clone()).unwrap());
        assert_eq!(ledger.admin(), &new);

        let doctor = Profession::new("Medical Doctor").unwrap();
        let err = ledger
            .set_ce_requirements(&old, doctor.clone(), 20, 365)
            .unwrap_err();
        assert_eq!(err.code(), "u1");
        assert!(ledger.set_ce_requirements(&new, doctor, 20, 365).unwrap());
    }

    #[test]
    fn rotation_is_guarded() {
        let mut ledger = ledger();
        let err = ledger
            .rotate_admin(&principal("ST2OTHER"), principal("ST2OTHER"))
            .unwrap_err();
        assert_eq!(err.code(), "u1");
        assert_eq!(ledger.admin(), &principal("ST1ADMIN"));
    }

    #[test]
    fn snapshot_roundtrip_preserves_answers() {
        let mut ledger = ledger();
        let admin = principal("ST1ADMIN");
        let pro = principal("ST2PRO");
        let doctor = Profession::new("Medical Doctor").unwrap();
        ledger
            .set_ce_requirements(&admin, doctor.clone(), 10, 100)
            .unwrap();
        let credit = ledger
            .add_ce_credit(&pro, pro.clone(), doctor.clone(), 10, LedgerTime::new(50))
            .unwrap();
        ledger.verify_ce_credit(&admin, &credit).unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        let mut restored: Ledger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger);
        assert!(restored.check_ce_compliance(&pro, &doctor, LedgerTime::new(100)));
        assert_eq!(restored.credits_for(&pro, &doctor).len(), 1);

        // Allocation continues from the restored sequence.
        let next = restored
            .add_ce_credit(&pro, pro.clone(), doctor, 1, LedgerTime::new(60))
            .unwrap();
        assert_eq!(next.as_str(), "credit-2");
    }

    #[test]
    fn restore_never_reuses_a_license_id() {
        let mut ledger = ledger();
        let admin = principal("ST1ADMIN");
        let doctor = Profession::new("Medical Doctor").unwrap();
        let first = ledger
            .issue_license(
                &admin,
                principal("ST2PRO"),
                doctor.clone(),
                LedgerTime::new(1),
                LedgerTime::new(10),
            )
            .unwrap();
        let mut value = serde_json::to_value(&ledger).unwrap();
        value["licenses"]["last_sequence"] = serde_json::json!(0);
        let mut restored: Ledger = serde_json::from_str(&value.to_string()).unwrap();

        let second = restored
            .issue_license(
                &admin,
                principal("ST3OTHER"),
                doctor,
                LedgerTime::new(1),
                LedgerTime::new(10),
            )
            .unwrap();
        assert_ne!(second, first);
        assert_eq!(
            restored.license(&first).unwrap().professional_id,
            principal("ST2PRO")
        );
    }

    #[test]
    fn restore_rejects_inverted_term() {
        let mut ledger = ledger();
        ledger
            .issue_license(
                &principal("ST1ADMIN"),
                principal("ST2PRO"),
                Profession::new("Nurse").unwrap(),
                LedgerTime::new(100),
                LedgerTime::new(200),
            )
            .unwrap();
        let mut value = serde_json::to_value(&ledger).unwrap();
        value["licenses"]["licenses"]["1"]["expiry_date"] = serde_json::json!(50);
        assert!(serde_json::from_str::<Ledger>(&value.to_string()).is_err());
    }

    #[test]
    fn authorize_helpers_match_operation_guards() {
        let ledger = ledger();
        let admin = principal("ST1ADMIN");
        let pro = principal("ST2PRO");
        assert!(ledger.authorize_admin(&admin, "issue_license").is_ok());
        assert_eq!(
            ledger.authorize_admin(&pro, "issue_license").unwrap_err().code(),
            "u1"
        );
        assert!(ledger.authorize_submitter(&pro, &pro, "add_ce_credit").is_ok());
        assert!(ledger.authorize_submitter(&admin, &pro, "add_ce_credit").is_ok());
        assert_eq!(
            ledger
                .authorize_submitter(&principal("ST3OTHER"), &pro, "add_ce_credit")
                .unwrap_err()
                .code(),
            "u1"
        );
    }
}
