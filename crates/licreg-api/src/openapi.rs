//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "licreg: Professional License & CE Ledger",
        version = "0.1.0",
        description = "License lifecycle, continuing-education policy and credits, and compliance evaluation.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Licenses
        crate::routes::licenses::issue_license,
        crate::routes::licenses::get_license,
        crate::routes::licenses::update_license,
        crate::routes::licenses::set_status,
        crate::routes::licenses::expire_lapsed,
        crate::routes::licenses::licenses_held,
        // CE policy
        crate::routes::professions::set_requirements,
        crate::routes::professions::get_requirements,
        // CE credits
        crate::routes::credits::add_credit,
        crate::routes::credits::get_credit,
        crate::routes::credits::verify_credit,
        // Compliance
        crate::routes::compliance::check_compliance,
        // Admin
        crate::routes::admin::current_admin,
        crate::routes::admin::rotate_admin,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::Ack,
        crate::routes::licenses::IssueLicenseRequest,
        crate::routes::licenses::IssuedLicense,
        crate::routes::licenses::UpdateLicenseRequest,
        crate::routes::licenses::SetStatusRequest,
        crate::routes::licenses::ExpireRequest,
        crate::routes::licenses::ExpiredLicenses,
        crate::routes::licenses::TransitionView,
        crate::routes::licenses::LicenseView,
        crate::routes::professions::SetRequirementsRequest,
        crate::routes::professions::RequirementsView,
        crate::routes::credits::AddCreditRequest,
        crate::routes::credits::AddedCredit,
        crate::routes::credits::CreditView,
        crate::routes::compliance::ComplianceView,
        crate::routes::admin::RotateAdminRequest,
        crate::routes::admin::AdminView,
    )),
    tags(
        (name = "licenses", description = "License registry"),
        (name = "professions", description = "Per-profession CE requirements"),
        (name = "credits", description = "CE credit ledger"),
        (name = "compliance", description = "CE compliance evaluation"),
        (name = "admin", description = "Ledger administration"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
