//! # licreg-api: HTTP Host for the License & CE Ledger
//!
//! Serves the ledger over HTTP. The handlers translate requests into ledger
//! calls on a shared [`licreg_ledger::SharedLedger`]; every authorization
//! decision is made by the ledger's access guard.
//!
//! ## API Surface
//!
//! | Prefix                         | Module                      |
//! |--------------------------------|-----------------------------|
//! | `/v1/licenses/*`               | [`routes::licenses`]        |
//! | `/v1/professionals/*`          | [`routes::licenses`]        |
//! | `/v1/professions/*`            | [`routes::professions`]     |
//! | `/v1/credits/*`                | [`routes::credits`]         |
//! | `/v1/compliance`               | [`routes::compliance`]      |
//! | `/v1/admin/*`                  | [`routes::admin`]           |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let api = Router::new()
        .merge(routes::licenses::router())
        .merge(routes::professions::router())
        .merge(routes::credits::router())
        .merge(routes::compliance::router())
        .merge(routes::admin::router())
        .merge(openapi::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::Extension(auth_config))
                .layer(from_fn(auth::auth_middleware)),
        )
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// How long readiness waits on a writer before reporting busy.
const READINESS_PATIENCE: Duration = Duration::from_millis(250);

/// Readiness probe: 503 when a writer holds the ledger past
/// [`READINESS_PATIENCE`].
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let ledger = state.ledger.clone();
    let available =
        tokio::task::spawn_blocking(move || ledger.is_available(READINESS_PATIENCE))
            .await
            .unwrap_or(false);
    if available {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "busy")
    }
}
