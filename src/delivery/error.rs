use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while handing mail to the delivery provider.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery provider is not configured: {0} is not set")]
    NotConfigured(&'static str),
    #[error("at least one of 'html' or 'text' must be provided")]
    EmptyBody,
    #[error("delivery HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider-supplied failure reason, preferred over the bare status.
    #[error("delivery provider error: {0}")]
    Provider(String),
    /// Transport-status fallback when the provider gave no usable message.
    #[error("delivery provider returned status {0}")]
    Status(StatusCode),
}
