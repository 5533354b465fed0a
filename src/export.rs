//! Rendering extraction results for display and download.
//!
//! - [`format_json_for_display`]: drops `null` and empty-string fields
//! - [`flatten_record`]: one `(column, cell)` pair per leaf, for the table view
//! - [`to_pretty_json`] / [`to_csv`]: download payloads

use serde_json::{Map, Value};

use crate::extraction::ExtractionResult;

/// Remove top-level fields whose value is `null` or `""`.
#[must_use]
pub fn format_json_for_display(data: &ExtractionResult) -> ExtractionResult {
    data.iter()
        .filter(|(_, v)| !matches!(v, Value::Null) && v.as_str() != Some(""))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Flatten a result into ordered `(column, cell)` pairs.
///
/// Nested objects become dotted column names (`Address.City`); arrays are
/// kept as compact JSON in a single cell.
#[must_use]
pub fn flatten_record(data: &ExtractionResult) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(data.len());
    flatten_into(&mut out, None, data);
    out
}

fn flatten_into(out: &mut Vec<(String, String)>, prefix: Option<&str>, map: &Map<String, Value>) {
    for (key, value) in map {
        let column = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(out, Some(&column), inner),
            other => out.push((column, cell(other))),
        }
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pretty JSON with two-space indentation, fields as returned.
pub fn to_pretty_json(data: &ExtractionResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(data)
}

/// One header row of flattened columns and one data row.
pub fn to_csv(data: &ExtractionResult) -> anyhow::Result<String> {
    let rows = flatten_record(data);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(rows.iter().map(|(column, _)| column.as_str()))?;
    writer.write_record(rows.iter().map(|(_, value)| value.as_str()))?;
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Download file name, e.g. `resume.pdf_extracted.json`.
#[must_use]
pub fn download_file_name(source_name: &str, extension: &str) -> String {
    let safe: String = source_name
        .chars()
        .map(|c| if c.is_control() || matches!(c, '"' | '/' | '\\') { '_' } else { c })
        .collect();
    format!("{safe}_extracted.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ExtractionResult {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_display_drops_null_and_empty() {
        let data = record(json!({"A": "x", "B": null, "C": ""}));
        assert_eq!(Value::Object(format_json_for_display(&data)), json!({"A": "x"}));
    }

    #[test]
    fn test_display_keeps_zero_and_empty_list() {
        let data = record(json!({"Items_Count": 0, "Top_Skills": [], "Flag": false}));
        assert_eq!(format_json_for_display(&data).len(), 3);
    }

    #[test]
    fn test_flatten_record() {
        let data = record(json!({
            "Name": "Ada",
            "Total_Years_Experience": 7,
            "Top_Skills": ["Rust", "SQL"],
            "Address": {"City": "London", "Zip": null},
            "Phone": null
        }));
        let rows = flatten_record(&data);
        assert_eq!(
            rows,
            vec![
                ("Name".to_string(), "Ada".to_string()),
                ("Total_Years_Experience".to_string(), "7".to_string()),
                ("Top_Skills".to_string(), "[\"Rust\",\"SQL\"]".to_string()),
                ("Address.City".to_string(), "London".to_string()),
                ("Address.Zip".to_string(), String::new()),
                ("Phone".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_pretty_json_uses_two_spaces() {
        let data = record(json!({"Name": "A"}));
        assert_eq!(to_pretty_json(&data).unwrap(), "{\n  \"Name\": \"A\"\n}");
    }

    #[test]
    fn test_csv_has_header_and_one_row() {
        let data = record(json!({
            "Invoice_Number": "INV-7",
            "Total_Amount": "$1,200.00",
            "Items_Count": 3
        }));
        let csv = to_csv(&data).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Invoice_Number,Total_Amount,Items_Count");
        assert_eq!(lines[1], "INV-7,\"$1,200.00\",3");
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name("cv.pdf", "csv"), "cv.pdf_extracted.csv");
        assert_eq!(download_file_name("a\"b.txt", "json"), "a_b.txt_extracted.json");
    }
}
