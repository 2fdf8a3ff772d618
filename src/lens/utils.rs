//! Common utility functions for lens modules
//!
//! This module provides the output format shared by every command and the helpers
//! that flatten lookup records into rows.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::lens::lookup::value_to_text;

/// How lookup results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One bordered field/value table per record
    #[default]
    Table,
    Markdown,
    /// Whole result on a single line
    Json,
    JsonPretty,
    /// One record per line
    JsonLine,
    /// Pipe-separated values, header row first
    Psv,
}

/// Canonical name first, then accepted aliases
const FORMAT_NAMES: &[(OutputFormat, &[&str])] = &[
    (OutputFormat::Table, &["table", "pretty"]),
    (OutputFormat::Markdown, &["markdown", "md"]),
    (OutputFormat::Json, &["json"]),
    (OutputFormat::JsonPretty, &["json-pretty", "jsonpretty"]),
    (OutputFormat::JsonLine, &["json-line", "jsonl", "ndjson"]),
    (OutputFormat::Psv, &["psv", "pipe"]),
];

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Canonical name as accepted by `--format`
    pub fn name(&self) -> &'static str {
        FORMAT_NAMES
            .iter()
            .find(|(format, _)| format == self)
            .and_then(|(_, names)| names.first().copied())
            .unwrap_or("table")
    }

    pub fn all_names() -> Vec<&'static str> {
        FORMAT_NAMES
            .iter()
            .filter_map(|(_, names)| names.first().copied())
            .collect()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FORMAT_NAMES
            .iter()
            .find(|(_, names)| names.contains(&wanted.as_str()))
            .map(|(format, _)| *format)
            .ok_or_else(|| {
                format!(
                    "unknown output format '{}', expected one of: {}",
                    s,
                    Self::all_names().join(", ")
                )
            })
    }
}

/// Flatten a serializable record into ordered `(field, value)` pairs.
///
/// `null` values become an empty string.
pub fn record_fields<T: Serialize>(record: &T) -> Vec<(String, String)> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map
            .into_iter()
            .map(|(k, v)| {
                let text = match v {
                    Value::Null => String::new(),
                    other => value_to_text(&other),
                };
                (k, text)
            })
            .collect(),
        _ => vec![],
    }
}

/// Render records as pipe-separated values with a header row taken from the first record
pub fn records_to_psv<T: Serialize>(records: &[T]) -> String {
    let rows: Vec<Vec<(String, String)>> = records.iter().map(record_fields).collect();
    let Some(first) = rows.first() else {
        return String::new();
    };

    let mut lines = vec![first
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join("|")];
    for row in &rows {
        lines.push(
            row.iter()
                .map(|(_, v)| v.as_str())
                .collect::<Vec<_>>()
                .join("|"),
        );
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        mac_address: String,
        country: Option<String>,
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(
            OutputFormat::from_str("table").unwrap(),
            OutputFormat::Table
        );
        assert_eq!(
            OutputFormat::from_str("pretty").unwrap(),
            OutputFormat::Table
        );
        assert_eq!(
            OutputFormat::from_str("md").unwrap(),
            OutputFormat::Markdown
        );
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str("json-pretty").unwrap(),
            OutputFormat::JsonPretty
        );
        assert_eq!(
            OutputFormat::from_str("jsonl").unwrap(),
            OutputFormat::JsonLine
        );
        assert_eq!(OutputFormat::from_str("psv").unwrap(), OutputFormat::Psv);
        assert!(OutputFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
        assert_eq!(OutputFormat::JsonPretty.to_string(), "json-pretty");
        assert_eq!(OutputFormat::JsonLine.to_string(), "json-line");
        assert_eq!(OutputFormat::Psv.to_string(), "psv");
    }

    #[test]
    fn test_output_format_names() {
        assert!(OutputFormat::JsonLine.is_json());
        assert!(!OutputFormat::Psv.is_json());
        assert_eq!(
            OutputFormat::all_names(),
            vec!["table", "markdown", "json", "json-pretty", "json-line", "psv"]
        );
    }

    #[test]
    fn test_record_fields_keep_order() {
        let sample = Sample {
            mac_address: "04:7b:cb:3b:75:94".to_string(),
            country: None,
        };
        assert_eq!(
            record_fields(&sample),
            vec![
                ("mac_address".to_string(), "04:7b:cb:3b:75:94".to_string()),
                ("country".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_records_to_psv() {
        let records = vec![
            Sample {
                mac_address: "a".to_string(),
                country: Some("US".to_string()),
            },
            Sample {
                mac_address: "b".to_string(),
                country: None,
            },
        ];
        assert_eq!(records_to_psv(&records), "mac_address|country\na|US\nb|");
        assert_eq!(records_to_psv::<Sample>(&[]), "");
    }
}
