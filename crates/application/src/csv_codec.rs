//! CSV export and bulk-import decoding for entity tables.
//!
//! Export quotes fields containing a comma, a double quote or a newline.
//! Import splits lines on bare commas and does not understand quoting, so a
//! quoted export only round-trips when its values need no escaping.

use chrono::NaiveDate;
use cmms_domain::{EntityRecord, scalar_text};

/// Serializes `records` under a header row of column labels.
///
/// `columns` pairs each record key with its header label. Absent and null
/// values render as empty fields. Rows are separated by `\n` with no
/// trailing newline.
#[must_use]
pub fn export_csv(records: &[EntityRecord], columns: &[(String, String)]) -> String {
    let header = columns
        .iter()
        .map(|(_, label)| label.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(header);

    for record in records {
        let row = columns
            .iter()
            .map(|(key, _)| {
                let value = record.get(key).and_then(scalar_text).unwrap_or_default();
                escape_field(&value)
            })
            .collect::<Vec<_>>()
            .join(",");
        rows.push(row);
    }

    rows.join("\n")
}

/// Decodes uploaded CSV text into records keyed by the trimmed header names.
///
/// Blank lines are skipped. A value is set only when its positional field is
/// non-empty, so short rows leave trailing keys absent. Text without any
/// line yields no records.
#[must_use]
pub fn import_csv(text: &str) -> Vec<EntityRecord> {
    let mut lines = text.split('\n');
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

    lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let values: Vec<&str> = line.split(',').collect();
            let mut record = EntityRecord::new();
            for (header, value) in headers.iter().zip(values) {
                if !value.is_empty() {
                    record.insert_text(*header, value.trim());
                }
            }
            record
        })
        .collect()
}

/// Returns the download name `{collection}_export_{YYYY-MM-DD}.csv`.
#[must_use]
pub fn export_file_name(collection: &str, date: NaiveDate) -> String {
    format!("{collection}_export_{}.csv", date.format("%Y-%m-%d"))
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}
