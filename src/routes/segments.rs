//! Segment suggestion endpoint: parse the export, build segments, rank them
//! against the campaign description.

use crate::cache::TtlCache;
use crate::crm::parse_delimited;
use crate::models::{CrmExport, ScoredSegment};
use crate::segments::{EMAIL_FIELD, build_segments, score_segment};
use chrono::Utc;
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

/// Request body for segment suggestions.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestSegmentsRequest {
    /// Raw CRM export to segment.
    pub export: CrmExport,
    /// Free-text description of the target group.
    #[serde(default)]
    pub description: String,
}

/// Ranked segment suggestions. Ordering is by score descending; ties keep
/// the deterministic builder order. Selection stays with the caller.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestSegmentsResponse {
    pub segments: Vec<ScoredSegment>,
}

#[openapi(tag = "Segments")]
#[post("/segments/suggest", data = "<request>")]
pub fn suggest_segments(
    request: Json<SuggestSegmentsRequest>,
    cache: &State<TtlCache>,
) -> Json<SuggestSegmentsResponse> {
    let request = request.into_inner();

    if let Some(cached) = cache.get::<_, SuggestSegmentsResponse>(&request) {
        log::debug!("segment suggestions served from cache");
        return Json(cached);
    }

    let table = parse_delimited(&request.export.contacts_csv);
    let segments = build_segments(&table, EMAIL_FIELD, Utc::now());

    let mut scored: Vec<ScoredSegment> = segments
        .into_iter()
        .map(|segment| {
            let score = score_segment(&segment, &request.description);
            ScoredSegment {
                suggested: score > 0,
                score,
                segment,
            }
        })
        .collect();
    scored.sort_by_key(|entry| std::cmp::Reverse(entry.score));

    log::info!(
        "built {} segment suggestions from {} contact rows",
        scored.len(),
        table.records.len()
    );

    let response = SuggestSegmentsResponse { segments: scored };
    cache.set(&request, &response);
    Json(response)
}
