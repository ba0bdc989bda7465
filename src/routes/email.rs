//! Email sending endpoints: single transactional sends, batch dispatch, and
//! configuration introspection.

use std::sync::Arc;

use crate::delivery::{DeliveryConfig, EmailSender, html_to_text};
use crate::dispatch::{DispatchConfig, dispatch_batch};
use crate::error::ApiError;
use crate::models::{DispatchResult, SendTask};
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

/// Request body for a single transactional send.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub status: String,
    pub provider: String,
}

/// Request body for a batch dispatch run.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    #[serde(default)]
    pub tasks: Vec<SendTask>,
}

/// Delivery environment status; does not send a test email.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfigResponse {
    pub configured: bool,
    pub missing: Vec<String>,
}

/// Send one transactional email.
///
/// Requires `to`, `subject`, and at least one of `text` / `html`. When only
/// HTML is supplied the plain-text alternative is derived from it. Provider
/// failures surface as 502 with the provider's message.
#[openapi(tag = "Email")]
#[post("/email/send", data = "<request>")]
pub async fn send_email(
    request: Json<SendEmailRequest>,
    sender: &State<Arc<dyn EmailSender>>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let request = request.into_inner();

    let html = request.html.as_deref().filter(|body| !body.trim().is_empty());
    let text = request.text.as_deref().filter(|body| !body.trim().is_empty());
    if html.is_none() && text.is_none() {
        return Err(ApiError::BadRequest(
            "At least one of 'text' or 'html' must be provided.".to_string(),
        ));
    }

    let derived;
    let text = match (text, html) {
        (None, Some(html_body)) => {
            derived = html_to_text(html_body);
            Some(derived.as_str())
        }
        (provided, _) => provided,
    };

    sender
        .send(request.to.trim(), &request.subject, html, text)
        .await
        .map_err(|err| ApiError::ProviderError(format!("Email provider error: {err}")))?;

    Ok(Json(SendEmailResponse {
        status: "sent".to_string(),
        provider: "sendgrid".to_string(),
    }))
}

/// Dispatch a batch of personalized sends.
///
/// Always responds 200: partial failure is data, not an error. The result
/// arrives only after every task has resolved.
#[openapi(tag = "Email")]
#[post("/email/dispatch", data = "<request>")]
pub async fn dispatch_emails(
    request: Json<DispatchRequest>,
    sender: &State<Arc<dyn EmailSender>>,
    config: &State<DispatchConfig>,
) -> Json<DispatchResult> {
    let tasks = request.into_inner().tasks;
    log::info!("dispatching batch of {} tasks", tasks.len());

    let result = dispatch_batch(Arc::clone(sender.inner()), tasks, config.inner()).await;
    Json(result)
}

/// Report whether the delivery environment variables are set.
#[openapi(tag = "Email")]
#[get("/email/config")]
pub fn email_config(config: &State<DeliveryConfig>) -> Json<EmailConfigResponse> {
    let missing = config.missing();
    Json(EmailConfigResponse {
        configured: missing.is_empty(),
        missing,
    })
}
