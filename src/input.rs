// Record input: reading a batch of free-text records from a file.
//
// Supported layouts, picked by extension and otherwise sniffed from content:
//   - a JSON array of strings, or of objects with a text field
//   - JSON lines, one string or object per line
//   - CSV with a header row; --field names the text column
//   - plain text, one record per line
//
// null, absent and blank values are Missing records. Numbers, booleans and
// arrays are NonText records, and unparseable lines or rows are Malformed
// records; the analyzer skips both with a diagnostic and keeps going.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, TopicanError};
use crate::topics::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    JsonArray,
    JsonLines,
    Csv,
    Text,
}

/// Load records from `path`. `field` names the text field of JSON objects
/// or the text column of a CSV file.
pub fn load_records(path: &Path, field: Option<&str>) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path).map_err(|e| TopicanError::resource(path, e))?;
    let layout = layout_from_extension(path).unwrap_or_else(|| {
        let sniffed = sniff_layout(&content);
        debug!(layout = ?sniffed, path = %path.display(), "Sniffed record layout");
        sniffed
    });
    let records = parse_records(&content, layout, field)
        .map_err(|e| TopicanError::invalid_data(path, e))?;
    info!(
        records = records.len(),
        layout = ?layout,
        path = %path.display(),
        "Loaded records"
    );
    Ok(records)
}

fn layout_from_extension(path: &Path) -> Option<Layout> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "json" => Some(Layout::JsonArray),
        "jsonl" | "ndjson" => Some(Layout::JsonLines),
        "csv" => Some(Layout::Csv),
        "txt" | "text" => Some(Layout::Text),
        _ => None,
    }
}

/// JSON only when the content actually parses as JSON; anything else is text.
fn sniff_layout(content: &str) -> Layout {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[')
        && serde_json::from_str::<Value>(trimmed).is_ok_and(|v| v.is_array())
    {
        return Layout::JsonArray;
    }
    let first_line = trimmed.lines().next().unwrap_or_default();
    if (first_line.starts_with('{') || first_line.starts_with('"'))
        && serde_json::from_str::<Value>(first_line).is_ok()
    {
        return Layout::JsonLines;
    }
    Layout::Text
}

fn parse_records(
    content: &str,
    layout: Layout,
    field: Option<&str>,
) -> std::result::Result<Vec<Record>, String> {
    match layout {
        Layout::Text => Ok(content
            .lines()
            .map(|line| {
                if line.trim().is_empty() {
                    Record::Missing
                } else {
                    Record::Text(line.to_string())
                }
            })
            .collect()),
        Layout::JsonArray => {
            let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
            match value {
                Value::Array(items) => Ok(items.iter().map(|v| to_record(v, field)).collect()),
                other => Err(format!("expected a JSON array, found {}", describe(&other))),
            }
        }
        Layout::JsonLines => Ok(content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| match serde_json::from_str::<Value>(line) {
                Ok(value) => to_record(&value, field),
                Err(e) => Record::Malformed(format!("malformed JSON on line {}: {e}", n + 1)),
            })
            .collect()),
        Layout::Csv => parse_csv(content, field),
    }
}

fn parse_csv(content: &str, field: Option<&str>) -> std::result::Result<Vec<Record>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = reader.headers().map_err(|e| e.to_string())?.clone();

    let column = match field {
        Some(name) => headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| {
                format!(
                    "no column named '{name}' (columns: {})",
                    headers.iter().collect::<Vec<_>>().join(", ")
                )
            })?,
        None if headers.len() == 1 => 0,
        None => {
            return Err(format!(
                "{} columns found; use --field to pick the text column",
                headers.len()
            ))
        }
    };

    Ok(reader
        .records()
        .enumerate()
        .map(|(n, row)| match row {
            Ok(row) => match row.get(column) {
                Some(cell) if !cell.trim().is_empty() => Record::Text(cell.to_string()),
                _ => Record::Missing,
            },
            Err(e) => Record::Malformed(format!("malformed CSV row {}: {e}", n + 1)),
        })
        .collect())
}

fn to_record(value: &Value, field: Option<&str>) -> Record {
    match value {
        Value::String(s) => Record::Text(s.clone()),
        Value::Null => Record::Missing,
        Value::Object(map) => match field {
            Some(name) => map
                .get(name)
                .map_or(Record::Missing, |inner| match inner {
                    Value::Object(_) => Record::NonText(describe(inner)),
                    _ => to_record(inner, None),
                }),
            None => Record::NonText("an object (use --field to pick its text)".to_string()),
        },
        other => Record::NonText(describe(other)),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}
