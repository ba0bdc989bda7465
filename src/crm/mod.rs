//! CRM export handling: tabular parsing and company-profile selection.

pub mod profile;
pub mod tabular;

pub use profile::select_company_profile;
pub use tabular::{ContactRecord, ContactTable, escape_field, parse_delimited};
