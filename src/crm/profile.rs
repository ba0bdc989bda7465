//! Company profile selection over the companies CSV blob.
//!
//! CRM company exports vary wildly in column naming, so each canonical
//! profile field is resolved through a list of candidate column names. The
//! result is a compact profile; any failure degrades to `None` so callers
//! can fall back to brand-only data.

use std::collections::HashMap;

use crate::crm::tabular::parse_delimited;
use crate::models::CompanyProfile;

/// Candidate column names per canonical profile field, checked in order.
const COMPANY_NAME_FIELDS: &[&str] = &["name", "company_name", "company", "organisation", "organization"];
const WEBSITE_FIELDS: &[&str] = &["domain", "website", "url", "homepage"];
const INDUSTRY_FIELDS: &[&str] = &["industry", "sector", "vertical"];
const LOCATION_FIELDS: &[&str] = &["city", "location", "country", "region", "hq_city", "hq_country"];
const DESCRIPTION_FIELDS: &[&str] = &["description", "short_description", "about", "summary", "business_type"];
const KEY_OFFER_FIELDS: &[&str] = &["key_offer", "offer", "product", "service", "value_proposition"];

/// Select one company row from the companies CSV and distill it.
///
/// `identifier`, when given, is matched case-insensitively as a substring
/// against the row's name and website (in both directions, so a bare domain
/// matches a full URL). Without a match the row with the highest numeric
/// `score` column wins, else the first row.
pub fn select_company_profile(companies_csv: &str, identifier: Option<&str>) -> Option<CompanyProfile> {
    if companies_csv.trim().is_empty() {
        log::warn!("companies CSV is absent or empty; skipping company enrichment");
        return None;
    }

    let table = parse_delimited(companies_csv);
    let rows: Vec<HashMap<String, String>> = table.records.iter().map(normalize_row).collect();
    if rows.is_empty() {
        log::warn!("companies CSV parsed to 0 rows");
        return None;
    }

    let selected = select_row(&rows, identifier);

    let mut profile = CompanyProfile {
        company_name: first_value(selected, COMPANY_NAME_FIELDS),
        website: first_value(selected, WEBSITE_FIELDS),
        industry: first_value(selected, INDUSTRY_FIELDS),
        location: first_value(selected, LOCATION_FIELDS),
        description: first_value(selected, DESCRIPTION_FIELDS),
        key_offer: first_value(selected, KEY_OFFER_FIELDS),
    };

    // Bare domains need a scheme before they can serve as a CTA link.
    if !profile.website.is_empty()
        && !profile.website.starts_with("http://")
        && !profile.website.starts_with("https://")
    {
        profile.website = format!("https://{}", profile.website);
    }

    // Bad CRM data sometimes puts a URL in the name column; derive a readable
    // name from the domain instead so it does not look odd in email copy.
    if profile.company_name.starts_with("http://")
        || profile.company_name.starts_with("https://")
        || profile.company_name.starts_with("www.")
    {
        if let Some(derived) = name_from_url(&profile.company_name) {
            profile.company_name = derived;
        }
    }

    log::info!(
        "company profile: name={:?} website={:?} industry={:?}",
        profile.company_name,
        profile.website,
        profile.industry
    );

    Some(profile)
}

fn select_row<'a>(
    rows: &'a [HashMap<String, String>],
    identifier: Option<&str>,
) -> &'a HashMap<String, String> {
    if let Some(identifier) = identifier {
        let ident = identifier.trim().to_lowercase();
        if !ident.is_empty() {
            for row in rows {
                let name = first_value(row, COMPANY_NAME_FIELDS).to_lowercase();
                let site = first_value(row, WEBSITE_FIELDS).to_lowercase();
                let name_hit = !name.is_empty() && (name.contains(&ident) || ident.contains(&name));
                let site_hit = !site.is_empty() && (site.contains(&ident) || ident.contains(&site));
                if name_hit || site_hit {
                    return row;
                }
            }
            log::info!("no company row matched identifier {identifier:?}; using first/best row");
        }
    }

    // Prefer the highest-scored row when a score column exists; ties keep
    // the earlier row.
    let mut best = &rows[0];
    if best.contains_key("score") {
        for row in &rows[1..] {
            if score_of(row) > score_of(best) {
                best = row;
            }
        }
    }

    best
}

fn score_of(row: &HashMap<String, String>) -> f64 {
    row.get("score")
        .and_then(|value| value.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Lower-case and trim keys, trim values.
fn normalize_row(record: &HashMap<String, String>) -> HashMap<String, String> {
    record
        .iter()
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
        .collect()
}

/// First non-empty value whose key appears in `candidates`.
fn first_value(row: &HashMap<String, String>, candidates: &[&str]) -> String {
    for key in candidates {
        if let Some(value) = row.get(*key) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    String::new()
}

/// Derive a display name from a URL-shaped value: "nordicwellness.se" from
/// "https://nordicwellness.se/about" becomes "Nordicwellness".
fn name_from_url(value: &str) -> Option<String> {
    let without_scheme = value
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let host = without_scheme.split(['/', '?', '#']).next()?;
    let host = host.trim_start_matches("www.");
    let base = host.split('.').next()?.replace('-', " ");
    if base.is_empty() {
        return None;
    }

    let title_cased = base
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    Some(title_cased)
}
