//! CRM enrichment endpoints.

use crate::crm::select_company_profile;
use crate::models::{CompanyProfile, CrmExport};
use rocket::serde::json::Json;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

/// Request body for company-profile selection.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfileRequest {
    pub export: CrmExport,
    /// Optional domain or company-name fragment used to pick a row.
    #[serde(default)]
    pub identifier: Option<String>,
}

/// Selected profile, or null when the companies blob is unusable.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfileResponse {
    pub profile: Option<CompanyProfile>,
}

#[openapi(tag = "CRM")]
#[post("/crm/company-profile", data = "<request>")]
pub fn company_profile(request: Json<CompanyProfileRequest>) -> Json<CompanyProfileResponse> {
    let request = request.into_inner();
    let profile = select_company_profile(
        &request.export.companies_csv,
        request.identifier.as_deref(),
    );

    Json(CompanyProfileResponse { profile })
}
