//! # Identity Newtypes
//!
//! Domain-primitive newtypes for the identifiers that flow through the
//! registry. Each identifier is a distinct type; a [`LicenseId`] cannot be
//! passed where a [`CreditId`] is expected, and a [`Profession`] is never
//! confused with a [`Principal`].
//!
//! ## Validation
//!
//! [`Principal`] and [`Profession`] validate format at construction time,
//! including when deserialized. [`LicenseId`] and [`CreditId`] are opaque:
//! the ledger allocates them from a per-table sequence, and ids arriving
//! from outside only need to be non-empty (an unknown id resolves to
//! `NotFound`, not to a validation failure).

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum length of a principal string.
pub const MAX_PRINCIPAL_LEN: usize = 128;

/// Maximum length of a profession name.
pub const MAX_PROFESSION_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Principals
// ---------------------------------------------------------------------------

/// An opaque caller identity, as established by the host's authentication
/// substrate (e.g. `ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG`).
///
/// The registry never interprets a principal beyond equality. Both callers
/// and license holders are principals.
///
/// # Validation
///
/// - Non-empty, at most [`MAX_PRINCIPAL_LEN`] characters.
/// - No whitespace.
/// - No `:`, which separates principal from secret in bearer credentials.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Create a principal, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPrincipal`] on malformed input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let reason = if s.is_empty() {
            Some("must be non-empty")
        } else if s.chars().count() > MAX_PRINCIPAL_LEN {
            Some("exceeds 128 characters")
        } else if s.chars().any(char::is_whitespace) {
            Some("must not contain whitespace")
        } else if s.contains(':') {
            Some("must not contain ':'")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(ValidationError::InvalidPrincipal { value: s, reason }),
            None => Ok(Self(s)),
        }
    }

    /// Access the principal string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Principal {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Professions
// ---------------------------------------------------------------------------

/// A profession name (e.g. `"Medical Doctor"`).
///
/// Keys CE policies and scopes licenses and credits. Stored trimmed, so
/// `" Nurse "` and `"Nurse"` name the same profession. Comparison is
/// otherwise exact (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Profession(String);

impl Profession {
    /// Create a profession name, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidProfession`] if the trimmed name is
    /// empty or longer than [`MAX_PROFESSION_LEN`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidProfession {
                value: raw,
                reason: "must be non-empty",
            });
        }
        if trimmed.chars().count() > MAX_PROFESSION_LEN {
            return Err(ValidationError::InvalidProfession {
                value: raw,
                reason: "exceeds 64 characters",
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the profession name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Profession {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Profession> for String {
    fn from(p: Profession) -> Self {
        p.0
    }
}

impl std::fmt::Display for Profession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Ledger-allocated identifiers
// ---------------------------------------------------------------------------

macro_rules! sequence_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse an identifier received from outside the ledger.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::InvalidIdentifier`] if the string is empty.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if s.trim().is_empty() {
                    return Err(ValidationError::InvalidIdentifier { kind: $kind });
                }
                Ok(Self(s))
            }

            /// The identifier the ledger allocates for sequence number `seq`.
            pub fn from_sequence(seq: u64) -> Self {
                Self(format!(concat!($prefix, "-{}"), seq))
            }

            /// The sequence number this identifier was allocated from, if it
            /// is in canonical `<prefix>-<n>` form.
            pub fn sequence(&self) -> Option<u64> {
                let digits = self.0.strip_prefix(concat!($prefix, "-"))?;
                let seq: u64 = digits.parse().ok()?;
                // Reject non-canonical spellings such as `license-007` or `license-+7`.
                (seq.to_string() == digits).then_some(seq)
            }

            /// Access the identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

sequence_id!(
    /// Identifier of a license record (`license-<n>`).
    LicenseId,
    "license",
    "license"
);

sequence_id!(
    /// Identifier of a CE credit record (`credit-<n>`).
    CreditId,
    "credit",
    "credit"
);

#[cfg(test)]
mod tests {
    use super::*;

    const PROFESSIONAL: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";

    #[test]
    fn principal_accepts_stacks_style_address() {
        let p = Principal::new(PROFESSIONAL).unwrap();
        assert_eq!(p.as_str(), PROFESSIONAL);
        assert_eq!(p.to_string(), PROFESSIONAL);
    }

    #[test]
    fn principal_rejects_empty() {
        assert!(Principal::new("").is_err());
    }

    #[test]
    fn principal_rejects_whitespace_and_colon() {
        assert!(Principal::new("ST1 ADMIN").is_err());
        assert!(Principal::new("ST1:secret").is_err());
    }

    #[test]
    fn principal_rejects_overlong() {
        let long = "A".repeat(MAX_PRINCIPAL_LEN + 1);
        assert!(Principal::new(long).is_err());
        let max = "A".repeat(MAX_PRINCIPAL_LEN);
        assert!(Principal::new(max).is_ok());
    }

    #[test]
    fn principal_deserialization_validates() {
        let ok: Principal = serde_json::from_str(&format!("\"{PROFESSIONAL}\"")).unwrap();
        assert_eq!(ok.as_str(), PROFESSIONAL);
        assert!(serde_json::from_str::<Principal>("\"\"").is_err());
    }

    #[test]
    fn profession_is_trimmed() {
        let p = Profession::new("  Medical Doctor ").unwrap();
        assert_eq!(p.as_str(), "Medical Doctor");
        assert_eq!(p, Profession::new("Medical Doctor").unwrap());
    }

    #[test]
    fn profession_rejects_blank_and_overlong() {
        assert!(Profession::new("   ").is_err());
        assert!(Profession::new("x".repeat(MAX_PROFESSION_LEN + 1)).is_err());
    }

    #[test]
    fn profession_is_case_sensitive() {
        assert_ne!(
            Profession::new("nurse").unwrap(),
            Profession::new("Nurse").unwrap()
        );
    }

    #[test]
    fn sequence_ids_are_prefixed() {
        assert_eq!(LicenseId::from_sequence(1).as_str(), "license-1");
        assert_eq!(CreditId::from_sequence(42).as_str(), "credit-42");
    }

    #[test]
    fn external_ids_only_need_to_be_non_empty() {
        assert_eq!(LicenseId::new("license-123").unwrap().as_str(), "license-123");
        assert!(LicenseId::new("").is_err());
        assert!(CreditId::new(" ").is_err());
    }

    #[test]
    fn sequence_parses_only_canonical_form() {
        assert_eq!(LicenseId::from_sequence(12).sequence(), Some(12));
        assert_eq!(LicenseId::new("license-007").unwrap().sequence(), None);
        assert_eq!(LicenseId::new("license-+7").unwrap().sequence(), None);
        assert_eq!(LicenseId::new("credit-7").unwrap().sequence(), None);
        assert_eq!(CreditId::new("credit-x").unwrap().sequence(), None);
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = CreditId::from_sequence(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"credit-7\"");
    }

    proptest::proptest! {
        #[test]
        fn principal_never_contains_separator(s in "\\PC{0,64}") {
            if let Ok(p) = Principal::new(s) {
                proptest::prop_assert!(!p.as_str().contains(':'));
                proptest::prop_assert!(!p.as_str().chars().any(char::is_whitespace));
            }
        }
    }
}
