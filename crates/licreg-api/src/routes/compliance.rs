//! # Compliance API
//!
//! `GET /v1/compliance?professional_id=&profession=&as_of=` evaluates CE
//! compliance and returns the numbers behind the answer. Public.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use licreg_core::{LedgerTime, Principal, Profession};
use licreg_ledger::ComplianceReport;

use crate::error::AppError;
use crate::extractors::extract_query;
use crate::state::AppState;

/// Compliance query parameters.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ComplianceQuery {
    /// The professional to evaluate.
    pub professional_id: String,
    /// The profession to evaluate against.
    pub profession: String,
    /// Evaluation date in ledger time units.
    pub as_of: u64,
}

/// Compliance evaluation result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComplianceView {
    pub professional_id: String,
    pub profession: String,
    pub as_of: u64,
    pub compliant: bool,
    /// Zero when the profession has no CE policy.
    pub required_credits: u64,
    /// Verified hours earned inside the window.
    pub earned_credits: u64,
    /// Inclusive window bounds; absent when the profession has no CE policy.
    pub window_start: Option<u64>,
    pub window_end: Option<u64>,
}

impl From<ComplianceReport> for ComplianceView {
    fn from(r: ComplianceReport) -> Self {
        Self {
            professional_id: r.professional_id.to_string(),
            profession: r.profession.to_string(),
            as_of: r.as_of.value(),
            compliant: r.compliant,
            required_credits: r.required_credits,
            earned_credits: r.earned_credits,
            window_start: r.window.map(|w| w.start.value()),
            window_end: r.window.map(|w| w.end.value()),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/compliance", get(check_compliance))
}

/// GET /v1/compliance: Evaluate CE compliance.
#[utoipa::path(
    get,
    path = "/v1/compliance",
    params(ComplianceQuery),
    responses(
        (status = 200, description = "Compliance evaluated", body = ComplianceView),
        (status = 400, description = "Missing or malformed query", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed principal or profession", body = crate::error::ErrorBody),
    ),
    tag = "compliance"
)]
pub(crate) async fn check_compliance(
    State(state): State<AppState>,
    query: Result<Query<ComplianceQuery>, QueryRejection>,
) -> Result<Json<ComplianceView>, AppError> {
    let query = extract_query(query)?;
    let professional_id = Principal::new(query.professional_id)?;
    let profession = Profession::new(query.profession)?;
    let as_of = LedgerTime::new(query.as_of);

    let report = state
        .ledger
        .read(|ledger| ledger.compliance_report(&professional_id, &profession, as_of));
    Ok(Json(report.into()))
}
