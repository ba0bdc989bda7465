//! Audience segmentation: building named groupings from contact tables and
//! scoring them against campaign descriptions.

pub mod builder;
pub mod scorer;

pub use builder::{EMAIL_FIELD, build_segments};
pub use scorer::score_segment;
