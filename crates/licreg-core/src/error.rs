//! # Error Hierarchy
//!
//! Validation errors for the domain primitives, built with `thiserror`.
//! Each variant carries the rejected input so that operators can diagnose
//! a bad request without guesswork.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Principal is empty, too long, or contains forbidden characters.
    #[error("invalid principal: \"{value}\" ({reason})")]
    InvalidPrincipal {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Profession name is empty after trimming or too long.
    #[error("invalid profession: \"{value}\" ({reason})")]
    InvalidProfession {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Record identifier is empty.
    #[error("invalid {kind} identifier: must be non-empty")]
    InvalidIdentifier {
        /// Which identifier namespace was being parsed.
        kind: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_principal_display_carries_input() {
        let err = ValidationError::InvalidPrincipal {
            value: "a b".to_string(),
            reason: "must not contain whitespace",
        };
        let msg = format!("{err}");
        assert!(msg.contains("a b"));
        assert!(msg.contains("whitespace"));
    }

    #[test]
    fn invalid_profession_display_carries_input() {
        let err = ValidationError::InvalidProfession {
            value: String::new(),
            reason: "must be non-empty",
        };
        assert!(format!("{err}").contains("non-empty"));
    }

    #[test]
    fn invalid_identifier_names_namespace() {
        let err = ValidationError::InvalidIdentifier { kind: "license" };
        assert_eq!(
            format!("{err}"),
            "invalid license identifier: must be non-empty"
        );
    }
}
