use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::EmailSender;
use super::config::DeliveryConfig;
use super::error::DeliveryError;

/// Thin client for the SendGrid v3 mail-send API.
///
/// Configuration completeness is checked per send rather than at startup so
/// the service stays usable (segment suggestions, config introspection)
/// without a provider account.
#[derive(Clone)]
pub struct DeliveryClient {
    http: reqwest::Client,
    config: DeliveryConfig,
}

impl DeliveryClient {
    pub fn new(config: DeliveryConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("campaign-server/0.1")
            .build()
            .map_err(DeliveryError::Http)?;

        Ok(Self {
            http: client,
            config,
        })
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }
}

#[rocket::async_trait]
impl EmailSender for DeliveryClient {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: Option<&str>,
        text: Option<&str>,
    ) -> Result<(), DeliveryError> {
        let html = html.filter(|body| !body.is_empty());
        let text = text.filter(|body| !body.is_empty());
        if html.is_none() && text.is_none() {
            return Err(DeliveryError::EmptyBody);
        }

        if self.config.api_key.is_empty() {
            return Err(DeliveryError::NotConfigured("SENDGRID_API_KEY"));
        }
        if self.config.from_email.is_empty() {
            return Err(DeliveryError::NotConfigured("EMAIL_FROM"));
        }

        // The provider requires text/plain content before text/html.
        let mut content = Vec::new();
        if let Some(body) = text {
            content.push(Content {
                content_type: "text/plain",
                value: body,
            });
        }
        if let Some(body) = html {
            content.push(Content {
                content_type: "text/html",
                value: body,
            });
        }

        let payload = MailSendRequest {
            personalizations: vec![Personalization {
                to: vec![EmailAddress { email: to }],
            }],
            from: EmailAddress {
                email: &self.config.from_email,
            },
            subject,
            content,
            reply_to: self
                .config
                .reply_to
                .as_deref()
                .map(|email| EmailAddress { email }),
        };

        let endpoint = format!(
            "{}/v3/mail/send",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(DeliveryError::Http)?;

        let status = response.status();
        if status.is_success() {
            log::info!("email sent to={to} status={status}");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(provider_failure(status, &body))
    }
}

/// Prefer the provider-supplied failure reason; fall back to the transport
/// status when the body does not carry one.
fn provider_failure(status: reqwest::StatusCode, body: &str) -> DeliveryError {
    if let Ok(parsed) = serde_json::from_str::<ProviderErrorBody>(body) {
        if let Some(message) = parsed
            .errors
            .into_iter()
            .filter_map(|error| error.message)
            .find(|message| !message.trim().is_empty())
        {
            return DeliveryError::Provider(message);
        }
    }

    DeliveryError::Status(status)
}

#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: EmailAddress<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<EmailAddress<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<EmailAddress<'a>>,
}

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    errors: Vec<ProviderErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn provider_message_wins_over_status() {
        let body = r#"{"errors":[{"message":"The from address does not match a verified Sender Identity"}]}"#;
        let error = provider_failure(StatusCode::FORBIDDEN, body);
        assert_eq!(
            error.to_string(),
            "delivery provider error: The from address does not match a verified Sender Identity"
        );
    }

    #[test]
    fn unparseable_body_falls_back_to_status() {
        let error = provider_failure(StatusCode::BAD_GATEWAY, "<html>upstream</html>");
        assert_eq!(
            error.to_string(),
            "delivery provider returned status 502 Bad Gateway"
        );
    }

    #[test]
    fn empty_message_list_falls_back_to_status() {
        let error = provider_failure(StatusCode::UNAUTHORIZED, r#"{"errors":[{}]}"#);
        assert!(matches!(error, DeliveryError::Status(_)));
    }
}
