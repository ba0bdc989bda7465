use chrono::{DateTime, Utc};
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ===== CRM Export Models =====

/// Raw CRM export as handed over after an export run: two CSV blobs plus
/// fetch metadata. Every field is lenient; a missing blob behaves like empty
/// text and missing columns are never a hard error.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrmExport {
    #[serde(default)]
    pub contacts_csv: String,
    #[serde(default)]
    pub companies_csv: String,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contact_count: Option<i64>,
    #[serde(default)]
    pub company_count: Option<i64>,
}

/// Compact company profile distilled from the companies CSV. Safe to embed
/// in downstream prompts: only the most relevant fields, no raw CSV.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub company_name: String,
    pub website: String,
    pub industry: String,
    pub location: String,
    pub description: String,
    pub key_offer: String,
}

// ===== Segment Models =====

/// A named audience grouping derived from shared contact field values.
///
/// `id` is a stable slug of the grouping key; `emails` holds unique, trimmed,
/// non-empty addresses in encounter order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub name: String,
    pub filter_label: String,
    pub emails: Vec<String>,
}

/// A segment annotated with how well it matches a campaign description.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSegment {
    #[serde(flatten)]
    pub segment: Segment,
    pub score: usize,
    pub suggested: bool,
}

// ===== Dispatch Models =====

/// Generated email variant shared by every recipient of one send batch.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailPayload {
    pub subject: String,
    pub html_content: String,
}

/// One unit of dispatch work: a single (email variant, recipient) pair.
/// `subject` may differ from the payload subject when personalized per task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendTask {
    pub email_payload: EmailPayload,
    pub recipient: String,
    pub subject: String,
}

/// Outcome of one failed send attempt.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchFailure {
    pub recipient: String,
    pub error: String,
}

/// Aggregate outcome of a dispatch batch. For every completed call,
/// `sent + failed.len()` equals the number of submitted tasks; `failed` is
/// ordered by completion, not submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub sent: usize,
    pub failed: Vec<DispatchFailure>,
}
