//! Lenient delimited-text parsing for CRM exports.
//!
//! CRM export blobs arrive as comma-separated text with double-quote quoting
//! and `""` as an escaped quote inside a quoted run. Real exports contain
//! broken quoting often enough that failing the whole blob is not an option:
//! a stray quote simply toggles quoted-run state and parsing continues.

use std::collections::HashMap;

/// One data row mapped by trimmed header name. The field set is open;
/// unknown columns are preserved but unused downstream.
pub type ContactRecord = HashMap<String, String>;

/// Parsed export table. `headers` preserves source column order so later
/// grouping passes never depend on map iteration order.
#[derive(Debug, Clone, Default)]
pub struct ContactTable {
    pub headers: Vec<String>,
    pub records: Vec<ContactRecord>,
}

impl ContactTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse a delimited-text blob into a [`ContactTable`].
///
/// The first non-blank line is the header row (names trimmed). Each further
/// non-blank line becomes one record; fields missing from a row map to the
/// empty string, extra fields beyond the header are dropped. A blob with
/// zero or one non-blank line yields zero records. Never fails.
pub fn parse_delimited(text: &str) -> ContactTable {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return ContactTable::default();
    };

    let headers: Vec<String> = split_line(header_line)
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect();

    let records = lines
        .map(|line| {
            let values = split_line(line);
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    (header.clone(), values.get(idx).cloned().unwrap_or_default())
                })
                .collect()
        })
        .collect();

    ContactTable { headers, records }
}

/// Split one row into fields, honoring quoting without ever failing.
///
/// Inside a quoted run, `""` emits a literal quote and a lone quote ends the
/// run. Outside, a quote starts a run and commas separate fields. A row with
/// unbalanced quotes degrades to treating the rest of the line as one run.
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
    }

    fields.push(current);
    fields
}

/// Quote a field value for re-serialization when it needs it.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_data_row_with_every_header() {
        let table = parse_delimited("name,email,age\nAda,ada@example.com,36\nLin,lin@example.com,28\n");

        assert_eq!(table.headers, vec!["name", "email", "age"]);
        assert_eq!(table.records.len(), 2);
        for record in &table.records {
            for header in &table.headers {
                assert!(record.contains_key(header));
            }
        }
        assert_eq!(table.records[0]["name"], "Ada");
        assert_eq!(table.records[1]["age"], "28");
    }

    #[test]
    fn quoted_comma_round_trips() {
        let table = parse_delimited("name,title\n\"Doe, Jane\",CEO\n");
        let value = &table.records[0]["name"];

        assert_eq!(value, "Doe, Jane");
        assert_eq!(escape_field(value), "\"Doe, Jane\"");
        assert_eq!(
            parse_delimited(&format!("name\n{}\n", escape_field(value))).records[0]["name"],
            "Doe, Jane"
        );
    }

    #[test]
    fn escaped_quotes_inside_quoted_field() {
        let table = parse_delimited("quote\n\"she said \"\"hi\"\"\"\n");
        assert_eq!(table.records[0]["quote"], "she said \"hi\"");
    }

    #[test]
    fn stray_quote_degrades_without_failing() {
        let table = parse_delimited("a,b\nbad\"value,rest\n");
        assert_eq!(table.records.len(), 1);
        // The stray quote opens a run that swallows the comma.
        assert_eq!(table.records[0]["a"], "badvalue,rest");
        assert_eq!(table.records[0]["b"], "");
    }

    #[test]
    fn header_only_and_empty_blobs_yield_no_records() {
        assert!(parse_delimited("").is_empty());
        assert!(parse_delimited("name,email\n").is_empty());
        assert!(parse_delimited("\n\n").is_empty());
    }

    #[test]
    fn short_rows_fill_missing_columns_with_empty_strings() {
        let table = parse_delimited("a,b,c\n1,2\n");
        assert_eq!(table.records[0]["a"], "1");
        assert_eq!(table.records[0]["b"], "2");
        assert_eq!(table.records[0]["c"], "");
    }

    #[test]
    fn headers_are_trimmed() {
        let table = parse_delimited(" name , email \nAda,ada@example.com\n");
        assert_eq!(table.headers, vec!["name", "email"]);
        assert_eq!(table.records[0]["email"], "ada@example.com");
    }
}
