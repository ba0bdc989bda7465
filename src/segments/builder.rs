//! Audience segment derivation from parsed contact tables.
//!
//! One synchronous pass produces a catch-all segment followed by segments
//! from three independent strategies in fixed order: categorical grouping,
//! numeric age brackets, and temporal tenure bands. Output is deterministic
//! for identical input: field discovery walks headers in source column
//! order, category values keep first-seen order, and bucket order is fixed.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::crm::tabular::{ContactRecord, ContactTable};
use crate::models::Segment;

/// Row-level column holding the recipient address.
pub const EMAIL_FIELD: &str = "email";

/// A field is materialized into categorical segments only when it yields
/// this many distinct non-empty values; below adds no signal, above is
/// treated as free-text.
const MIN_CATEGORY_VALUES: usize = 2;
const MAX_CATEGORY_VALUES: usize = 8;

/// Column names recognized as the age-like and start-date-like fields.
const AGE_FIELDS: &[&str] = &["age", "age_years"];
const TENURE_FIELDS: &[&str] = &[
    "start_date",
    "member_since",
    "signup_date",
    "customer_since",
    "joined_at",
];

const AGE_BRACKETS: &[&str] = &["Under 30", "30–45", "Over 45"];
const TENURE_BANDS: &[&str] = &["<1 yr", "1–2 yrs", "2+ yrs"];

const DAYS_PER_YEAR: i64 = 365;

/// Build the full segment list for a contact table.
///
/// Rows whose email field trims to empty are invisible to every strategy;
/// segments exist to own recipient addresses. `now` is the evaluation
/// instant for tenure bands, passed in so output is reproducible.
pub fn build_segments(table: &ContactTable, email_field: &str, now: DateTime<Utc>) -> Vec<Segment> {
    let members: Vec<(String, &ContactRecord)> = table
        .records
        .iter()
        .filter_map(|record| {
            let email = record.get(email_field).map(|v| v.trim()).unwrap_or_default();
            (!email.is_empty()).then(|| (email.to_string(), record))
        })
        .collect();

    let mut segments = Vec::new();

    let all_emails = unique_emails(members.iter().map(|(email, _)| email.as_str()));
    segments.push(Segment {
        id: "all-contacts".to_string(),
        name: "All Contacts".to_string(),
        filter_label: format!("all contacts with an email address · {} contacts", all_emails.len()),
        emails: all_emails,
    });

    let age_field = find_field(&table.headers, AGE_FIELDS);
    let tenure_field = find_field(&table.headers, TENURE_FIELDS);

    categorical_segments(&members, &table.headers, email_field, age_field, tenure_field, &mut segments);

    if let Some(field) = age_field {
        bracket_segments(&members, field, AGE_BRACKETS, age_bracket_index, &mut segments);
    }

    if let Some(field) = tenure_field {
        bracket_segments(
            &members,
            field,
            TENURE_BANDS,
            |value| tenure_band_index(value, now),
            &mut segments,
        );
    }

    segments
}

/// Group rows by exact trimmed value of each remaining column.
///
/// The gate is all-or-nothing per field: a field outside the 2..=8 distinct
/// value range contributes no segments at all.
fn categorical_segments(
    members: &[(String, &ContactRecord)],
    headers: &[String],
    email_field: &str,
    age_field: Option<&String>,
    tenure_field: Option<&String>,
    segments: &mut Vec<Segment>,
) {
    for header in headers {
        if header.is_empty()
            || header == email_field
            || Some(header) == age_field
            || Some(header) == tenure_field
        {
            continue;
        }

        let mut value_order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();

        for (email, record) in members {
            let value = record.get(header).map(|v| v.trim()).unwrap_or_default();
            if value.is_empty() {
                continue;
            }
            let entry = groups.entry(value.to_string()).or_default();
            if entry.is_empty() {
                value_order.push(value.to_string());
            }
            entry.push(email.clone());
        }

        if value_order.len() < MIN_CATEGORY_VALUES || value_order.len() > MAX_CATEGORY_VALUES {
            continue;
        }

        for value in value_order {
            let emails = unique_emails(groups[&value].iter().map(String::as_str));
            segments.push(make_segment(header, &value, emails));
        }
    }
}

/// Bucket rows of one column through `bucket_of` and emit the non-empty
/// buckets, in fixed bucket order, when at least two are populated.
fn bracket_segments(
    members: &[(String, &ContactRecord)],
    field: &String,
    labels: &[&str],
    bucket_of: impl Fn(&str) -> Option<usize>,
    segments: &mut Vec<Segment>,
) {
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); labels.len()];

    for (email, record) in members {
        let value = record.get(field).map(|v| v.trim()).unwrap_or_default();
        if value.is_empty() {
            continue;
        }
        if let Some(idx) = bucket_of(value) {
            buckets[idx].push(email.clone());
        }
    }

    let populated = buckets.iter().filter(|bucket| !bucket.is_empty()).count();
    if populated < 2 {
        return;
    }

    for (label, bucket) in labels.iter().zip(buckets) {
        if bucket.is_empty() {
            continue;
        }
        let emails = unique_emails(bucket.iter().map(String::as_str));
        segments.push(make_segment(field, label, emails));
    }
}

/// Bracket index for an age value; unparseable and negative values are
/// excluded from all brackets.
fn age_bracket_index(value: &str) -> Option<usize> {
    let age = value.parse::<i64>().ok()?;
    if age < 0 {
        return None;
    }
    Some(if age < 30 {
        0
    } else if age <= 45 {
        1
    } else {
        2
    })
}

/// Tenure band index by elapsed time since a start date; unparseable dates
/// are excluded. Dates in the future land in the shortest band.
fn tenure_band_index(value: &str, now: DateTime<Utc>) -> Option<usize> {
    let started = dateparser::parse(value).ok()?;
    let days = now.signed_duration_since(started).num_days();
    Some(if days < DAYS_PER_YEAR {
        0
    } else if days < 2 * DAYS_PER_YEAR {
        1
    } else {
        2
    })
}

fn make_segment(field: &str, value: &str, emails: Vec<String>) -> Segment {
    Segment {
        id: slugify(&format!("{field} {value}")),
        name: value.to_string(),
        filter_label: format!("{field}: {value} · {} contacts", emails.len()),
        emails,
    }
}

/// Deduplicate while preserving encounter order.
fn unique_emails<'a>(emails: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for email in emails {
        if seen.insert(email.to_string()) {
            unique.push(email.to_string());
        }
    }
    unique
}

/// Stable slug for a grouping key: lowercase alphanumeric runs joined by
/// single dashes.
fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// First header matching one of the candidate names, case-insensitively.
fn find_field<'a>(headers: &'a [String], candidates: &[&str]) -> Option<&'a String> {
    headers
        .iter()
        .find(|header| candidates.contains(&header.trim().to_lowercase().as_str()))
}
