//! # CE Credit API
//!
//! - `POST /v1/credits`: submit a credit (the professional or the admin)
//! - `GET /v1/credits/:id`: get a credit
//! - `POST /v1/credits/:id/verify`: verify a credit (admin)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use licreg_core::{CreditId, LedgerTime, Principal, Profession};
use licreg_state::CeCredit;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_json, require_non_empty, Validate};
use crate::routes::Ack;
use crate::state::AppState;

/// A CE credit submission.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCreditRequest {
    pub professional_id: String,
    pub profession: String,
    /// Credit hours; must be positive.
    pub hours: u64,
    pub earned_date: u64,
}

impl Validate for AddCreditRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("professional_id", &self.professional_id)?;
        require_non_empty("profession", &self.profession)
    }
}

/// Identifier of a newly recorded credit.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddedCredit {
    pub credit_id: String,
}

/// A CE credit as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreditView {
    pub id: String,
    pub professional_id: String,
    pub profession: String,
    pub hours: u64,
    pub earned_date: u64,
    pub verified: bool,
    /// The admin that verified the credit, once verified.
    pub verifier: Option<String>,
}

impl From<&CeCredit> for CreditView {
    fn from(c: &CeCredit) -> Self {
        Self {
            id: c.id.to_string(),
            professional_id: c.professional_id.to_string(),
            profession: c.profession.to_string(),
            hours: c.hours,
            earned_date: c.earned_date.value(),
            verified: c.is_verified(),
            verifier: c.verifier().map(ToString::to_string),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/credits", post(add_credit))
        .route("/v1/credits/:id", get(get_credit))
        .route("/v1/credits/:id/verify", post(verify_credit))
}

/// POST /v1/credits: Submit a CE credit, unverified.
#[utoipa::path(
    post,
    path = "/v1/credits",
    request_body = AddCreditRequest,
    responses(
        (status = 201, description = "Credit recorded", body = AddedCredit),
        (status = 401, description = "No caller identity", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is neither the professional nor the admin", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid argument", body = crate::error::ErrorBody),
    ),
    tag = "credits"
)]
pub(crate) async fn add_credit(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<AddCreditRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddedCredit>), AppError> {
    let req = extract_json(body)?;
    // The submission guard needs the subject, so only the principal is
    // parsed ahead of it.
    let professional_id = Principal::new(req.professional_id.as_str())?;
    state.ledger.read(|ledger| {
        ledger.authorize_submitter(&caller.principal, &professional_id, "add_ce_credit")
    })?;
    req.validate().map_err(AppError::Validation)?;
    let profession = Profession::new(req.profession)?;

    let id = state.ledger.apply(|ledger| {
        ledger.add_ce_credit(
            &caller.principal,
            professional_id,
            profession,
            req.hours,
            LedgerTime::new(req.earned_date),
        )
    })?;
    Ok((
        StatusCode::CREATED,
        Json(AddedCredit {
            credit_id: id.to_string(),
        }),
    ))
}

/// GET /v1/credits/:id: Get a CE credit.
#[utoipa::path(
    get,
    path = "/v1/credits/{id}",
    params(("id" = String, Path, description = "Credit ID")),
    responses(
        (status = 200, description = "Credit found", body = CreditView),
        (status = 404, description = "Credit not found", body = crate::error::ErrorBody),
    ),
    tag = "credits"
)]
pub(crate) async fn get_credit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CreditView>, AppError> {
    let id = CreditId::new(id)?;
    let view = state
        .ledger
        .read(|ledger| ledger.ce_credit(&id).map(CreditView::from))?;
    Ok(Json(view))
}

/// POST /v1/credits/:id/verify: Mark a credit verified. Idempotent.
#[utoipa::path(
    post,
    path = "/v1/credits/{id}/verify",
    params(("id" = String, Path, description = "Credit ID")),
    responses(
        (status = 200, description = "Credit verified", body = Ack),
        (status = 403, description = "Caller is not the admin", body = crate::error::ErrorBody),
        (status = 404, description = "Credit not found", body = crate::error::ErrorBody),
    ),
    tag = "credits"
)]
pub(crate) async fn verify_credit(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<Ack>, AppError> {
    state
        .ledger
        .read(|ledger| ledger.authorize_admin(&caller.principal, "verify_ce_credit"))?;
    let id = CreditId::new(id)?;
    let ok = state
        .ledger
        .apply(|ledger| ledger.verify_ce_credit(&caller.principal, &id))?;
    Ok(Json(Ack { ok }))
}
