//! # License Registry
//!
//! License records and their status lifecycle. Licenses are created by
//! issuance, change only through guarded operations, and are never
//! deleted: revocation and expiry are terminal statuses, not removals.
//!
//! ## Duplicate Issuance
//!
//! Whether a professional may hold two live licenses for the same
//! profession is a deployment decision, captured by
//! [`DuplicateLicensePolicy`]. The default rejects the second issuance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use licreg_core::{LedgerTime, LicenseId, Principal, Profession};
use licreg_state::{License, LicenseStatus};

use crate::access::{require_admin, AccessPolicy};
use crate::error::LedgerError;

/// How issuance treats a professional who already holds a live (active or
/// suspended) license for the same profession.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateLicensePolicy {
    /// Fail with `InvalidArgument`.
    #[default]
    Reject,
    /// Issue an additional license.
    Allow,
}

impl std::str::FromStr for DuplicateLicensePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "allow" => Ok(Self::Allow),
            other => Err(format!(
                "unknown duplicate license policy: {other} (expected reject or allow)"
            )),
        }
    }
}

/// Non-status fields that [`LicenseRegistry::update_info`] may change.
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseUpdate {
    /// New profession.
    pub profession: Option<Profession>,
    /// New expiry date; must stay after the issue date.
    pub expiry_date: Option<LedgerTime>,
}

impl LicenseUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.profession.is_none() && self.expiry_date.is_none()
    }
}

/// Table of licenses keyed by allocation sequence.
///
/// Restoring from a snapshot goes through [`RegistryRecord`]: every key must
/// match its license id, every term must be well formed, and the allocator
/// never restarts below a stored sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegistryRecord")]
pub struct LicenseRegistry {
    licenses: BTreeMap<u64, License>,
    last_sequence: u64,
    duplicates: DuplicateLicensePolicy,
}

/// Unchecked wire form of a [`LicenseRegistry`].
#[derive(Deserialize)]
struct RegistryRecord {
    licenses: BTreeMap<u64, License>,
    last_sequence: u64,
    duplicates: DuplicateLicensePolicy,
}

impl TryFrom<RegistryRecord> for LicenseRegistry {
    type Error = LedgerError;

    fn try_from(record: RegistryRecord) -> Result<Self, Self::Error> {
        for (sequence, license) in &record.licenses {
            if license.id.sequence() != Some(*sequence) {
                return Err(LedgerError::invalid(format!(
                    "license {} stored under sequence {sequence}",
                    license.id
                )));
            }
            check_term(license.issue_date, license.expiry_date)?;
        }
        let highest = record.licenses.keys().next_back().copied().unwrap_or(0);
        Ok(Self {
            last_sequence: record.last_sequence.max(highest),
            licenses: record.licenses,
            duplicates: record.duplicates,
        })
    }
}

impl LicenseRegistry {
    /// Create an empty registry.
    pub fn new(duplicates: DuplicateLicensePolicy) -> Self {
        Self {
            licenses: BTreeMap::new(),
            last_sequence: 0,
            duplicates,
        }
    }

    /// Issue a license. Admin only.
    ///
    /// Requires `expiry_date > issue_date`. The new license is
    /// [`LicenseStatus::Active`].
    pub fn issue(
        &mut self,
        guard: &dyn AccessPolicy,
        caller: &Principal,
        professional_id: Principal,
        profession: Profession,
        issue_date: LedgerTime,
        expiry_date: LedgerTime,
    ) -> Result<LicenseId, LedgerError> {
        require_admin(guard, caller, "issue_license")?;
        check_term(issue_date, expiry_date)?;
        self.check_duplicate(&professional_id, &profession, None)?;
        let sequence = self
            .last_sequence
            .checked_add(1)
            .ok_or_else(|| LedgerError::invalid("license identifier space exhausted"))?;

        let id = LicenseId::from_sequence(sequence);
        tracing::info!(
            license_id = %id,
            professional_id = %professional_id,
            profession = %profession,
            issue_date = %issue_date,
            expiry_date = %expiry_date,
            "license issued"
        );
        let license = License::issued(
            id.clone(),
            professional_id,
            profession,
            issue_date,
            expiry_date,
        );
        self.licenses.insert(sequence, license);
        self.last_sequence = sequence;
        Ok(id)
    }

    /// Look up a license.
    pub fn get(&self, id: &LicenseId) -> Result<&License, LedgerError> {
        id.sequence()
            .and_then(|seq| self.licenses.get(&seq))
            .ok_or_else(|| LedgerError::not_found("license", id))
    }

    /// Change non-status fields of a license. Admin only.
    ///
    /// Status is unreachable through this path; use
    /// [`LicenseRegistry::set_status`].
    pub fn update_info(
        &mut self,
        guard: &dyn AccessPolicy,
        caller: &Principal,
        id: &LicenseId,
        update: LicenseUpdate,
    ) -> Result<bool, LedgerError> {
        require_admin(guard, caller, "update_license_info")?;
        let current = self.get(id)?;
        if update.is_empty() {
            return Err(LedgerError::invalid("update names no fields"));
        }
        if let Some(expiry_date) = update.expiry_date {
            check_term(current.issue_date, expiry_date)?;
        }
        if let Some(profession) = &update.profession {
            if current.is_live() && profession != &current.profession {
                self.check_duplicate(&current.professional_id, profession, id.sequence())?;
            }
        }

        let license = id
            .sequence()
            .and_then(|seq| self.licenses.get_mut(&seq))
            .ok_or_else(|| LedgerError::not_found("license", id))?;
        if let Some(profession) = update.profession {
            license.profession = profession;
        }
        if let Some(expiry_date) = update.expiry_date {
            license.expiry_date = expiry_date;
        }
        tracing::info!(
            license_id = %id,
            profession = %license.profession,
            expiry_date = %license.expiry_date,
            "license info updated"
        );
        Ok(true)
    }

    /// Move a license to `status`. Admin only.
    ///
    /// Only edges of [`LicenseStatus::TRANSITIONS`] succeed; everything else,
    /// including any move out of a terminal status, fails with
    /// `InvalidTransition`.
    pub fn set_status(
        &mut self,
        guard: &dyn AccessPolicy,
        caller: &Principal,
        id: &LicenseId,
        status: LicenseStatus,
    ) -> Result<bool, LedgerError> {
        require_admin(guard, caller, "set_license_status")?;
        let license = id
            .sequence()
            .and_then(|seq| self.licenses.get_mut(&seq))
            .ok_or_else(|| LedgerError::not_found("license", id))?;
        let from = license.status;
        license.transition(status, caller.clone())?;
        tracing::info!(license_id = %id, %from, to = %status, actor = %caller, "license status changed");
        Ok(true)
    }

    /// Expire every active license whose term has run out at `as_of`.
    /// Admin only.
    ///
    /// Suspended licenses are left alone: `suspended → expired` is not an
    /// edge. Returns the expired ids in issuance order.
    pub fn expire_lapsed(
        &mut self,
        guard: &dyn AccessPolicy,
        caller: &Principal,
        as_of: LedgerTime,
    ) -> Result<Vec<LicenseId>, LedgerError> {
        require_admin(guard, caller, "expire_lapsed_licenses")?;
        let mut expired = Vec::new();
        for license in self.licenses.values_mut() {
            if license.status == LicenseStatus::Active && license.has_lapsed(as_of) {
                // Active -> Expired is always an edge, so this cannot fail
                // part-way through the sweep.
                license.transition(LicenseStatus::Expired, caller.clone())?;
                expired.push(license.id.clone());
            }
        }
        tracing::info!(as_of = %as_of, count = expired.len(), "lapsed licenses expired");
        Ok(expired)
    }

    /// Every license ever issued to `professional_id`, in issuance order.
    pub fn held_by<'a>(
        &'a self,
        professional_id: &'a Principal,
    ) -> impl Iterator<Item = &'a License> + 'a {
        self.licenses
            .values()
            .filter(move |l| &l.professional_id == professional_id)
    }

    /// Number of licenses ever issued.
    pub fn len(&self) -> usize {
        self.licenses.len()
    }

    /// Whether no license has been issued.
    pub fn is_empty(&self) -> bool {
        self.licenses.is_empty()
    }

    fn check_duplicate(
        &self,
        professional_id: &Principal,
        profession: &Profession,
        excluding: Option<u64>,
    ) -> Result<(), LedgerError> {
        if self.duplicates == DuplicateLicensePolicy::Allow {
            return Ok(());
        }
        let existing = self.licenses.iter().find(|(seq, l)| {
            Some(**seq) != excluding
                && l.is_live()
                && &l.professional_id == professional_id
                && &l.profession == profession
        });
        match existing {
            Some((_, l)) => Err(LedgerError::invalid(format!(
                "{professional_id} already holds live license {} for {profession}",
                l.id
            ))),
            None => Ok(()),
        }
    }
}

fn check_term(issue_date: LedgerTime, expiry_date: LedgerTime) -> Result<(), LedgerError> {
    if expiry_date <= issue_date {
        return Err(LedgerError::invalid(format!(
            "expiry date {expiry_date} must be after issue date {issue_date}"
        )));
    }
    Ok(())
}
