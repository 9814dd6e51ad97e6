//! # Application State & Configuration
//!
//! [`AppConfig`] is read from the environment at startup. [`AppState`] holds
//! the shared ledger handle that every handler operates on.

use std::sync::Arc;

use thiserror::Error;

use licreg_core::Principal;
use licreg_ledger::{DuplicateLicensePolicy, Ledger, LedgerConfig, SharedLedger};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Configuration errors. Any of these aborts startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {var}: {reason}")]
    Invalid {
        /// The offending variable.
        var: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Host configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared bearer secret. If `None`, bearer tokens carry only a principal.
    pub auth_token: Option<String>,
    /// Initial ledger admin.
    pub admin: Principal,
    /// How issuance treats duplicate live licenses.
    pub duplicate_licenses: DuplicateLicensePolicy,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("admin", &self.admin)
            .field("duplicate_licenses", &self.duplicate_licenses)
            .finish()
    }
}

impl AppConfig {
    /// Defaults with auth disabled, administered by `admin`.
    pub fn new(admin: Principal) -> Self {
        Self {
            port: DEFAULT_PORT,
            auth_token: None,
            admin,
            duplicate_licenses: DuplicateLicensePolicy::default(),
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let admin = get("LICREG_ADMIN").ok_or(ConfigError::Missing("LICREG_ADMIN"))?;
        let admin = Principal::new(admin.trim()).map_err(|e| ConfigError::Invalid {
            var: "LICREG_ADMIN",
            reason: e.to_string(),
        })?;

        let port = match get("PORT") {
            Some(p) => p.trim().parse().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let duplicate_licenses = match get("LICREG_DUPLICATE_LICENSES") {
            Some(v) => v.parse().map_err(|reason| ConfigError::Invalid {
                var: "LICREG_DUPLICATE_LICENSES",
                reason,
            })?,
            None => DuplicateLicensePolicy::default(),
        };

        Ok(Self {
            port,
            auth_token: get("AUTH_TOKEN"),
            admin,
            duplicate_licenses,
        })
    }

    /// The ledger initialization parameters this configuration implies.
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            admin: self.admin.clone(),
            duplicate_licenses: self.duplicate_licenses,
        }
    }
}

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub ledger: SharedLedger,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// A fresh, empty ledger configured by `config`.
    pub fn new(config: AppConfig) -> Self {
        let ledger = SharedLedger::new(Ledger::new(config.ledger_config()));
        Self {
            ledger,
            config: Arc::new(config),
        }
    }
}
