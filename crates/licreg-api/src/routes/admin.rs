//! # Administration API
//!
//! - `GET /v1/admin`: current admin principal
//! - `POST /v1/admin/rotate`: hand administration to another principal (admin)

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use licreg_core::Principal;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, require_non_empty, Validate};
use crate::state::AppState;

/// Admin rotation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RotateAdminRequest {
    pub new_admin: String,
}

impl Validate for RotateAdminRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("new_admin", &self.new_admin)
    }
}

/// The admin principal.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminView {
    pub admin: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/admin", get(current_admin))
        .route("/v1/admin/rotate", post(rotate_admin))
}

/// GET /v1/admin: The current admin.
#[utoipa::path(
    get,
    path = "/v1/admin",
    responses((status = 200, description = "Current admin", body = AdminView)),
    tag = "admin"
)]
pub(crate) async fn current_admin(State(state): State<AppState>) -> Json<AdminView> {
    let admin = state.ledger.read(|ledger| ledger.admin().to_string());
    Json(AdminView { admin })
}

/// POST /v1/admin/rotate: Replace the admin. The caller loses admin rights.
#[utoipa::path(
    post,
    path = "/v1/admin/rotate",
    request_body = RotateAdminRequest,
    responses(
        (status = 200, description = "Admin rotated", body = AdminView),
        (status = 403, description = "Caller is not the admin", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed principal", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub(crate) async fn rotate_admin(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<RotateAdminRequest>, JsonRejection>,
) -> Result<Json<AdminView>, AppError> {
    state
        .ledger
        .read(|ledger| ledger.authorize_admin(&caller.principal, "rotate_admin"))?;
    let req = extract_validated_json(body)?;
    let new_admin = Principal::new(req.new_admin.trim())?;
    let admin = state.ledger.apply(|ledger| {
        ledger.rotate_admin(&caller.principal, new_admin)?;
        Ok::<_, AppError>(ledger.admin().to_string())
    })?;
    Ok(Json(AdminView { admin }))
}
