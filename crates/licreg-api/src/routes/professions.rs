//! # CE Policy API
//!
//! - `PUT /v1/professions/:profession/requirements`: set requirements (admin)
//! - `GET /v1/professions/:profession/requirements`: get requirements

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use licreg_core::Profession;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::routes::Ack;
use crate::state::AppState;

/// New CE requirements for a profession. Replaces any existing policy.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRequirementsRequest {
    /// Verified hours required per cycle.
    pub required_credits: u64,
    /// Cycle length in ledger time units; must be positive.
    pub cycle_length: u64,
}

/// A profession's CE policy.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequirementsView {
    pub profession: String,
    pub required_credits: u64,
    pub cycle_length: u64,
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/professions/:profession/requirements",
        get(get_requirements).put(set_requirements),
    )
}

/// PUT /v1/professions/:profession/requirements: Set CE requirements.
#[utoipa::path(
    put,
    path = "/v1/professions/{profession}/requirements",
    params(("profession" = String, Path, description = "Profession name")),
    request_body = SetRequirementsRequest,
    responses(
        (status = 200, description = "Requirements stored", body = Ack),
        (status = 403, description = "Caller is not the admin", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid argument", body = crate::error::ErrorBody),
    ),
    tag = "professions"
)]
pub(crate) async fn set_requirements(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(profession): Path<String>,
    body: Result<Json<SetRequirementsRequest>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    state
        .ledger
        .read(|ledger| ledger.authorize_admin(&caller.principal, "set_ce_requirements"))?;
    let req = extract_json(body)?;
    let profession = Profession::new(profession)?;
    let ok = state.ledger.apply(|ledger| {
        ledger.set_ce_requirements(
            &caller.principal,
            profession,
            req.required_credits,
            req.cycle_length,
        )
    })?;
    Ok(Json(Ack { ok }))
}

/// GET /v1/professions/:profession/requirements: Get CE requirements.
#[utoipa::path(
    get,
    path = "/v1/professions/{profession}/requirements",
    params(("profession" = String, Path, description = "Profession name")),
    responses(
        (status = 200, description = "Policy found", body = RequirementsView),
        (status = 404, description = "No policy for profession", body = crate::error::ErrorBody),
    ),
    tag = "professions"
)]
pub(crate) async fn get_requirements(
    State(state): State<AppState>,
    Path(profession): Path<String>,
) -> Result<Json<RequirementsView>, AppError> {
    let profession = Profession::new(profession)?;
    let view = state.ledger.read(|ledger| {
        ledger
            .ce_requirements(&profession)
            .map(|policy| RequirementsView {
                profession: profession.to_string(),
                required_credits: policy.required_credits,
                cycle_length: policy.cycle_length,
            })
    })?;
    Ok(Json(view))
}
