//! HTTP route handlers grouped by resource domain.
//!
//! Each submodule corresponds to a logical area of the API (health,
//! segments, CRM enrichment, email) and exposes typed Rocket handlers
//! annotated with `#[openapi]` so `rocket_okapi` can derive an OpenAPI
//! document automatically.

pub mod crm;
pub mod email;
pub mod health;
pub mod segments;
