use std::env;
use std::time::Duration;

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_duration_millis(key: &str, default_millis: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default_millis))
}

/// Configuration for the delivery provider client.
///
/// The API key and sender address are intentionally allowed to be empty at
/// startup; they are checked per send so the rest of the service works
/// without a provider account (mirrored by the `/email/config` endpoint).
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub api_key: String,
    pub from_email: String,
    pub reply_to: Option<String>,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl DeliveryConfig {
    pub fn from_env() -> Self {
        let reply_to = env_string("EMAIL_REPLY_TO", "");
        Self {
            api_key: env_string("SENDGRID_API_KEY", ""),
            from_email: env_string("EMAIL_FROM", ""),
            reply_to: (!reply_to.is_empty()).then_some(reply_to),
            base_url: env_string("SENDGRID_BASE_URL", "https://api.sendgrid.com"),
            request_timeout: env_duration_millis("DELIVERY_TIMEOUT_MS", 30_000),
        }
    }

    /// Names of required environment variables that are not set.
    pub fn missing(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.api_key.is_empty() {
            missing.push("SENDGRID_API_KEY".to_string());
        }
        if self.from_email.is_empty() {
            missing.push("EMAIL_FROM".to_string());
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.missing().is_empty()
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
