//! Liveness and readiness endpoints used for probes and tests.

use crate::delivery::DeliveryConfig;
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Basic response payload describing API health.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Static status string reporting application readiness.
    pub status: String,
    /// Crate version baked in at compile time.
    pub version: String,
    /// Whether the delivery provider environment is fully configured.
    pub delivery_configured: bool,
}

/// Readiness payload with named checks.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: JsonMap<String, JsonValue>,
}

/// Liveness probe: 200 as long as the process is running.
#[openapi(tag = "Health")]
#[get("/health")]
pub fn health_check(delivery: &State<DeliveryConfig>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        delivery_configured: delivery.is_configured(),
    })
}

/// Readiness probe: reports the delivery environment checks individually.
#[openapi(tag = "Health")]
#[get("/health/ready")]
pub fn readiness(delivery: &State<DeliveryConfig>) -> Json<ReadinessResponse> {
    let mut checks = JsonMap::new();
    checks.insert(
        "deliveryApiKeyConfigured".to_string(),
        JsonValue::Bool(!delivery.api_key.is_empty()),
    );
    checks.insert(
        "deliveryFromConfigured".to_string(),
        JsonValue::Bool(!delivery.from_email.is_empty()),
    );

    Json(ReadinessResponse {
        ready: delivery.is_configured(),
        checks,
    })
}
