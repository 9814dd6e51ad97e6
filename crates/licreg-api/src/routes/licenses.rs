//! # License Registry API
//!
//! ## Endpoints
//!
//! - `POST /v1/licenses`: issue license (admin)
//! - `GET /v1/licenses/:id`: get license
//! - `PATCH /v1/licenses/:id`: update profession / expiry (admin)
//! - `PUT /v1/licenses/:id/status`: change status (admin)
//! - `POST /v1/licenses/expire`: expire lapsed licenses (admin)
//! - `GET /v1/professionals/:principal/licenses`: licenses held
//!
//! Admin handlers run the ledger's access guard before decoding the body,
//! so a non-admin gets 403 whatever they send.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use licreg_core::{LedgerTime, LicenseId, Principal, Profession};
use licreg_ledger::LicenseUpdate;
use licreg_state::{License, LicenseStatus, StatusTransition};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, require_non_empty, Validate};
use crate::routes::Ack;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to issue a license.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueLicenseRequest {
    pub professional_id: String,
    pub profession: String,
    pub issue_date: u64,
    pub expiry_date: u64,
}

impl Validate for IssueLicenseRequest {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("professional_id", &self.professional_id)?;
        require_non_empty("profession", &self.profession)
    }
}

/// Identifier of a newly issued license.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IssuedLicense {
    pub license_id: String,
}

/// Partial update of a license's non-status fields.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateLicenseRequest {
    pub profession: Option<String>,
    pub expiry_date: Option<u64>,
}

/// Requested status change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStatusRequest {
    /// One of `active`, `suspended`, `revoked`, `expired`.
    pub status: String,
}

/// Lapse sweep parameters.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExpireRequest {
    pub as_of: u64,
}

/// Licenses moved to `expired` by a sweep.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpiredLicenses {
    pub expired: Vec<String>,
}

/// One recorded status change.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransitionView {
    pub from: String,
    pub to: String,
    pub actor: String,
}

impl From<&StatusTransition> for TransitionView {
    fn from(t: &StatusTransition) -> Self {
        Self {
            from: t.from.to_string(),
            to: t.to.to_string(),
            actor: t.actor.to_string(),
        }
    }
}

/// A license as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LicenseView {
    pub id: String,
    pub professional_id: String,
    pub profession: String,
    pub issue_date: u64,
    pub expiry_date: u64,
    pub status: String,
    pub transitions: Vec<TransitionView>,
}

impl From<&License> for LicenseView {
    fn from(l: &License) -> Self {
        Self {
            id: l.id.to_string(),
            professional_id: l.professional_id.to_string(),
            profession: l.profession.to_string(),
            issue_date: l.issue_date.value(),
            expiry_date: l.expiry_date.value(),
            status: l.status.to_string(),
            transitions: l.transitions.iter().map(TransitionView::from).collect(),
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/licenses", post(issue_license))
        .route("/v1/licenses/expire", post(expire_lapsed))
        .route("/v1/licenses/:id", get(get_license).patch(update_license))
        .route("/v1/licenses/:id/status", put(set_status))
        .route("/v1/professionals/:principal/licenses", get(licenses_held))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/licenses: Issue a license.
#[utoipa::path(
    post,
    path = "/v1/licenses",
    request_body = IssueLicenseRequest,
    responses(
        (status = 201, description = "License issued", body = IssuedLicense),
        (status = 401, description = "No caller identity", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not the admin", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid argument", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub(crate) async fn issue_license(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<IssueLicenseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IssuedLicense>), AppError> {
    state
        .ledger
        .read(|ledger| ledger.authorize_admin(&caller.principal, "issue_license"))?;
    let req = extract_validated_json(body)?;
    let professional_id = Principal::new(req.professional_id)?;
    let profession = Profession::new(req.profession)?;

    let id = state.ledger.apply(|ledger| {
        ledger.issue_license(
            &caller.principal,
            professional_id,
            profession,
            LedgerTime::new(req.issue_date),
            LedgerTime::new(req.expiry_date),
        )
    })?;
    Ok((
        StatusCode::CREATED,
        Json(IssuedLicense {
            license_id: id.to_string(),
        }),
    ))
}

/// GET /v1/licenses/:id: Get a license.
#[utoipa::path(
    get,
    path = "/v1/licenses/{id}",
    params(("id" = String, Path, description = "License ID")),
    responses(
        (status = 200, description = "License found", body = LicenseView),
        (status = 404, description = "License not found", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub(crate) async fn get_license(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LicenseView>, AppError> {
    let id = LicenseId::new(id)?;
    let view = state
        .ledger
        .read(|ledger| ledger.license(&id).map(LicenseView::from))?;
    Ok(Json(view))
}

/// PATCH /v1/licenses/:id: Update profession and/or expiry date.
#[utoipa::path(
    patch,
    path = "/v1/licenses/{id}",
    params(("id" = String, Path, description = "License ID")),
    request_body = UpdateLicenseRequest,
    responses(
        (status = 200, description = "License updated", body = Ack),
        (status = 403, description = "Caller is not the admin", body = crate::error::ErrorBody),
        (status = 404, description = "License not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid argument", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub(crate) async fn update_license(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
    body: Result<Json<UpdateLicenseRequest>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    state
        .ledger
        .read(|ledger| ledger.authorize_admin(&caller.principal, "update_license_info"))?;
    let req = extract_json(body)?;
    let id = LicenseId::new(id)?;
    let update = LicenseUpdate {
        profession: req.profession.map(Profession::new).transpose()?,
        expiry_date: req.expiry_date.map(LedgerTime::new),
    };

    let ok = state
        .ledger
        .apply(|ledger| ledger.update_license_info(&caller.principal, &id, update))?;
    Ok(Json(Ack { ok }))
}

/// PUT /v1/licenses/:id/status: Move a license along the status machine.
#[utoipa::path(
    put,
    path = "/v1/licenses/{id}/status",
    params(("id" = String, Path, description = "License ID")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Ack),
        (status = 403, description = "Caller is not the admin", body = crate::error::ErrorBody),
        (status = 404, description = "License not found", body = crate::error::ErrorBody),
        (status = 409, description = "Illegal transition", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub(crate) async fn set_status(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
    body: Result<Json<SetStatusRequest>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    state
        .ledger
        .read(|ledger| ledger.authorize_admin(&caller.principal, "set_license_status"))?;
    let req = extract_json(body)?;
    let id = LicenseId::new(id)?;
    let status: LicenseStatus = req.status.parse().map_err(AppError::Validation)?;

    let ok = state
        .ledger
        .apply(|ledger| ledger.set_license_status(&caller.principal, &id, status))?;
    Ok(Json(Ack { ok }))
}

/// POST /v1/licenses/expire: Expire every active license lapsed at `as_of`.
#[utoipa::path(
    post,
    path = "/v1/licenses/expire",
    request_body = ExpireRequest,
    responses(
        (status = 200, description = "Sweep complete", body = ExpiredLicenses),
        (status = 403, description = "Caller is not the admin", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub(crate) async fn expire_lapsed(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<ExpireRequest>, JsonRejection>,
) -> Result<Json<ExpiredLicenses>, AppError> {
    state
        .ledger
        .read(|ledger| ledger.authorize_admin(&caller.principal, "expire_lapsed_licenses"))?;
    let req = extract_json(body)?;
    let expired = state.ledger.apply(|ledger| {
        ledger.expire_lapsed_licenses(&caller.principal, LedgerTime::new(req.as_of))
    })?;
    Ok(Json(ExpiredLicenses {
        expired: expired.iter().map(ToString::to_string).collect(),
    }))
}

/// GET /v1/professionals/:principal/licenses: Licenses held, in issuance order.
#[utoipa::path(
    get,
    path = "/v1/professionals/{principal}/licenses",
    params(("principal" = String, Path, description = "Professional principal")),
    responses(
        (status = 200, description = "Licenses held", body = Vec<LicenseView>),
        (status = 422, description = "Malformed principal", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub(crate) async fn licenses_held(
    State(state): State<AppState>,
    Path(principal): Path<String>,
) -> Result<Json<Vec<LicenseView>>, AppError> {
    let principal = Principal::new(principal)?;
    let views = state.ledger.read(|ledger| {
        ledger
            .licenses_held_by(&principal)
            .into_iter()
            .map(LicenseView::from)
            .collect()
    });
    Ok(Json(views))
}
