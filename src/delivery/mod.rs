//! Delivery provider integration: the send seam, its client implementation,
//! configuration, and plain-text fallback derivation.

pub mod client;
pub mod config;
pub mod error;
pub mod text;

pub use client::DeliveryClient;
pub use config::DeliveryConfig;
pub use error::DeliveryError;
pub use text::html_to_text;

/// The one operation this service consumes from the delivery provider.
///
/// Implemented by [`DeliveryClient`] in production and by in-memory mocks in
/// tests; the dispatch engine only ever sees this trait.
#[rocket::async_trait]
pub trait EmailSender: Send + Sync {
    /// Attempt one send. At least one of `html` / `text` must be non-empty.
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: Option<&str>,
        text: Option<&str>,
    ) -> Result<(), DeliveryError>;
}
