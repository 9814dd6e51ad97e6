//! # Compliance Evaluator
//!
//! Answers whether a professional currently satisfies their profession's
//! CE policy. The evaluator stores nothing; it is a pure function of the
//! policy store and the credit ledger, and needs no authorization:
//! compliance is publicly verifiable, like license status.
//!
//! ## Algorithm
//!
//! 1. No policy for the profession → compliant.
//! 2. Window = `[as_of − cycle_length, as_of]`, inclusive on both ends,
//!    with the lower bound saturating at zero.
//! 3. Sum the hours of *verified* credits of `(professional, profession)`
//!    earned inside the window.
//! 4. Compliant iff the sum reaches `required_credits`.

use serde::{Deserialize, Serialize};

use licreg_core::{LedgerTime, Principal, Profession};

use crate::credits::CreditLedger;
use crate::policy::PolicyStore;

/// Inclusive range of earned dates that count toward compliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceWindow {
    /// Earliest counted earned date.
    pub start: LedgerTime,
    /// Latest counted earned date (the as-of date).
    pub end: LedgerTime,
}

impl ComplianceWindow {
    /// The window of length `cycle_length` ending at `as_of`.
    pub fn ending_at(as_of: LedgerTime, cycle_length: u64) -> Self {
        Self {
            start: as_of.saturating_sub(cycle_length),
            end: as_of,
        }
    }

    /// Whether `t` falls inside the window.
    pub fn contains(&self, t: LedgerTime) -> bool {
        self.start <= t && t <= self.end
    }
}

/// The full outcome of a compliance evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// The professional evaluated.
    pub professional_id: Principal,
    /// The profession evaluated.
    pub profession: Profession,
    /// The as-of date of the evaluation.
    pub as_of: LedgerTime,
    /// Hours the policy requires; zero when there is no policy.
    pub required_credits: u64,
    /// Verified hours earned inside the window.
    pub earned_credits: u64,
    /// The counted window; `None` when there is no policy.
    pub window: Option<ComplianceWindow>,
    /// Whether the professional is compliant.
    pub compliant: bool,
}

/// Read-only view over the two ledgers that compliance is derived from.
#[derive(Debug, Clone, Copy)]
pub struct ComplianceEvaluator<'a> {
    policies: &'a PolicyStore,
    credits: &'a CreditLedger,
}

impl<'a> ComplianceEvaluator<'a> {
    /// Evaluate against a snapshot of the policy store and credit ledger.
    pub fn new(policies: &'a PolicyStore, credits: &'a CreditLedger) -> Self {
        Self { policies, credits }
    }

    /// Evaluate and explain compliance of `(professional_id, profession)`
    /// at `as_of`.
    pub fn report(
        &self,
        professional_id: &Principal,
        profession: &Profession,
        as_of: LedgerTime,
    ) -> ComplianceReport {
        let Some(policy) = self.policies.find(profession) else {
            return ComplianceReport {
                professional_id: professional_id.clone(),
                profession: profession.clone(),
                as_of,
                required_credits: 0,
                earned_credits: 0,
                window: None,
                compliant: true,
            };
        };

        let window = ComplianceWindow::ending_at(as_of, policy.cycle_length);
        let earned_credits = self
            .credits
            .credits_for(professional_id, profession)
            .filter(|c| c.is_verified() && window.contains(c.earned_date))
            .fold(0u64, |sum, c| sum.saturating_add(c.hours));

        ComplianceReport {
            professional_id: professional_id.clone(),
            profession: profession.clone(),
            as_of,
            required_credits: policy.required_credits,
            earned_credits,
            window: Some(window),
            compliant: earned_credits >= policy.required_credits,
        }
    }

    /// Whether `(professional_id, profession)` is compliant at `as_of`.
    pub fn check(
        &self,
        professional_id: &Principal,
        profession: &Profession,
        as_of: LedgerTime,
    ) -> bool {
        self.report(professional_id, profession, as_of).compliant
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

    struct Fixture {
        guard: AdminPolicy,
        admin: Principal,
        policies: PolicyStore,
        credits: CreditLedger,
    }

    impl Fixture {
        fn new() -> Self {
            let admin = principal("ST1ADMIN");
            Self {
                guard: AdminPolicy::new(admin.clone()),
                admin,
                policies: PolicyStore::new(),
                credits: CreditLedger::new(),
            }
        }

        fn policy(&mut self, required: u64, cycle: u64) {
            self.policies
                .set_requirements(&self.guard, &self.admin, doctor(), required, cycle)
                .unwrap();
        }

        fn credit(&mut self, hours: u64, earned: u64, verified: bool) {
            let id = self
                .credits
                .add(
                    &self.guard,
                    &self.admin,
                    principal("ST2PRO"),
                    doctor(),
                    hours,
                    LedgerTime::new(earned),
                )
                .unwrap();
            if verified {
                self.credits.verify(&self.guard, &self.admin, &id).unwrap();
            }
        }

        fn report(&self, as_of: u64) -> ComplianceReport {
            ComplianceEvaluator::new(&self.policies, &self.credits).report(
                &principal("ST2PRO"),
                &doctor(),
                LedgerTime::new(as_of),
            )
        }
    }

    #[test]
    fn no_policy_is_trivially_compliant() {
        let fx = Fixture::new();
        let report = fx.report(1_000);
        assert!(report.compliant);
        assert_eq!(report.window, None);
        assert_eq!(report.required_credits, 0);
    }

    #[test]
    fn verified_credits_inside_window_count() {
        let mut fx = Fixture::new();
        fx.policy(20, 365);
        fx.credit(12, 900, true);
        fx.credit(10, 1_000, true);
        let report = fx.report(1_000);
        assert_eq!(report.earned_credits, 22);
        assert!(report.compliant);
    }

    #[test]
    fn shortfall_is_non_compliant() {
        let mut fx = Fixture::new();
        fx.policy(20, 365);
        fx.credit(10, 1_000, true);
        assert!(!fx.report(1_000).compliant);
    }

    #[test]
    fn unverified_credits_do_not_count() {
        let mut fx = Fixture::new();
        fx.policy(20, 365);
        fx.credit(25, 900, false);
        assert_eq!(fx.report(1_000).earned_credits, 0);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let mut fx = Fixture::new();
        fx.policy(2, 365);
        fx.credit(1, 635, true);
        fx.credit(1, 1_000, true);
        fx.credit(100, 634, true);
        fx.credit(100, 1_001, true);
        let report = fx.report(1_000);
        assert_eq!(
            report.window,
            Some(ComplianceWindow {
                start: LedgerTime::new(635),
                end: LedgerTime::new(1_000)
            })
        );
        assert_eq!(report.earned_credits, 2);
        assert!(report.compliant);
    }

    #[test]
    fn window_saturates_at_zero() {
        let mut fx = Fixture::new();
        fx.policy(5, 365);
        fx.credit(5, 0, true);
        let report = fx.report(100);
        assert_eq!(report.window.unwrap().start, LedgerTime::ZERO);
        assert!(report.compliant);
    }

    #[test]
    fn zero_requirement_is_compliant_without_credits() {
        let mut fx = Fixture::new();
        fx.policy(0, 30);
        assert!(fx.report(10).compliant);
    }

    #[test]
    fn hour_sum_saturates() {
        let mut fx = Fixture::new();
        fx.policy(u64::MAX, 10);
        fx.credit(u64::MAX, 5, true);
        fx.credit(1, 5, true);
        let report = fx.report(10);
        assert_eq!(report.earned_credits, u64::MAX);
        assert!(report.compliant);
    }
}
