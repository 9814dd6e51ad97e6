//! # Authentication Middleware
//!
//! Bearer credentials name the calling principal. The ledger makes every
//! authorization decision itself; this layer only establishes *who* is
//! calling.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {principal}:{secret}   (AUTH_TOKEN set)
//! Bearer {principal}            (auth disabled, development only)
//! ```
//!
//! The secret is one value shared by every caller. It keeps strangers out
//! of the API; it does not bind a caller to a principal. Anyone holding it
//! may name any principal, the admin included. Deployments that need
//! per-principal credentials must establish identity in front of this
//! service.
//!
//! Requests without an `Authorization` header pass through anonymously.
//! Public reads work; any handler that extracts [`CallerIdentity`] answers
//! 401.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;

use licreg_core::Principal;

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// The authenticated principal behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub principal: Principal,
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if the request is anonymous.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("bearer credentials required".into()))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of shared secrets.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token into the caller's identity.
///
/// With a configured secret the token must be `{principal}:{secret}`;
/// without one it is the bare principal.
pub fn parse_bearer_token(
    provided: &str,
    expected_secret: Option<&str>,
) -> Result<CallerIdentity, String> {
    let principal = match expected_secret {
        Some(expected) => {
            let (principal, secret) = provided
                .rsplit_once(':')
                .ok_or_else(|| "invalid token format, expected {principal}:{secret}".to_string())?;
            if !constant_time_token_eq(secret, expected) {
                return Err("invalid bearer token".into());
            }
            principal
        }
        None => provided,
    };
    let principal = Principal::new(principal).map_err(|e| e.to_string())?;
    Ok(CallerIdentity { principal })
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Validate the Bearer token, if any, and inject the [`CallerIdentity`].
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|c| c.token.clone());

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().map(str::to_owned));

    match auth_header {
        None => next.run(request).await,
        Some(Ok(value)) => match value.strip_prefix("Bearer ") {
            Some(provided) => match parse_bearer_token(provided, expected.as_deref()) {
                Ok(identity) => {
                    tracing::debug!(principal = %identity.principal, "caller authenticated");
                    request.extensions_mut().insert(identity);
                    next.run(request).await
                }
                Err(msg) => {
                    tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                    unauthorized_response(&msg)
                }
            },
            None => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                unauthorized_response("authorization header must use Bearer scheme")
            }
        },
        Some(Err(_)) => {
            tracing::warn!("authentication failed: non-ASCII authorization header");
            unauthorized_response("authorization header is not valid ASCII")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
