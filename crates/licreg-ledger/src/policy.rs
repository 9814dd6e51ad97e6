//! # Profession CE Policy Store
//!
//! Per-profession continuing-education requirements. At most one policy
//! exists per profession; setting a policy again overwrites it. A
//! profession without a policy carries no CE obligation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use licreg_core::{Principal, Profession};

use crate::access::{require_admin, AccessPolicy};
use crate::error::LedgerError;

/// CE requirement for one profession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CePolicy {
    /// Verified credit hours required within one cycle.
    pub required_credits: u64,
    /// Length of the look-back window, in ledger time units. Always positive.
    pub cycle_length: u64,
}

/// Table of CE policies keyed by profession.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyRecord")]
pub struct PolicyStore {
    policies: BTreeMap<Profession, CePolicy>,
}

/// Unchecked wire form of a [`PolicyStore`].
#[derive(Deserialize)]
struct PolicyRecord {
    policies: BTreeMap<Profession, CePolicy>,
}

impl TryFrom<PolicyRecord> for PolicyStore {
    type Error = LedgerError;

    fn try_from(record: PolicyRecord) -> Result<Self, Self::Error> {
        if let Some(profession) = record
            .policies
            .iter()
            .find(|(_, policy)| policy.cycle_length == 0)
            .map(|(profession, _)| profession)
        {
            return Err(LedgerError::invalid(format!(
                "ce policy for {profession} has a zero cycle_length"
            )));
        }
        Ok(Self {
            policies: record.policies,
        })
    }
}

impl PolicyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) the CE requirement for `profession`.
    ///
    /// Admin only. `cycle_length` must be positive; a zero
    /// `required_credits` is allowed and makes compliance trivial.
    pub fn set_requirements(
        &mut self,
        guard: &dyn AccessPolicy,
        caller: &Principal,
        profession: Profession,
        required_credits: u64,
        cycle_length: u64,
    ) -> Result<bool, LedgerError> {
        require_admin(guard, caller, "set_ce_requirements")?;
        if cycle_length == 0 {
            return Err(LedgerError::invalid("cycle_length must be positive"));
        }

        let policy = CePolicy {
            required_credits,
            cycle_length,
        };
        let previous = self.policies.insert(profession.clone(), policy);
        tracing::info!(
            profession = %profession,
            required_credits,
            cycle_length,
            replaced = previous.is_some(),
            "CE requirements set"
        );
        Ok(true)
    }

    /// The policy for `profession`, or `NotFound` when the profession has
    /// no CE obligation.
    pub fn get(&self, profession: &Profession) -> Result<&CePolicy, LedgerError> {
        self.find(profession)
            .ok_or_else(|| LedgerError::not_found("ce policy", profession))
    }

    /// The policy for `profession`, if any.
    pub fn find(&self, profession: &Profession) -> Option<&CePolicy> {
        self.policies.get(profession)
    }

    /// Number of professions with a policy.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether no policy has been set.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
