//! Defensive field extraction from raw JSON responses
//!
//! Every source reads its fields through [`FieldReader`], which walks a nested path,
//! reports a missing path once through `tracing`, and lets the caller decide whether
//! a missing or empty value becomes `null` or a sentinel string. A missing field never
//! aborts the extraction of the remaining fields.

use serde_json::Value;
use tracing::warn;

/// Outcome of reading one nested path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    /// Some segment of the path does not exist
    Missing,
    /// The path exists but holds `null`, `""`, `[]` or `{}`
    Empty,
    Present(&'a Value),
}

impl<'a> Field<'a> {
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }
}

/// Walk `path` through nested objects. Numeric segments index into arrays.
pub fn json_path<'a>(raw: &'a Value, path: &[&str]) -> Field<'a> {
    let mut current = raw;
    for segment in path {
        let next = match current {
            Value::Object(map) => map.get(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(v) => current = v,
            None => return Field::Missing,
        }
    }

    if is_empty(current) {
        Field::Empty
    } else {
        Field::Present(current)
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Render a JSON value as a flat string.
///
/// Strings are returned unquoted, arrays are joined with `", "`, and everything else
/// uses its JSON text (`37.751`, `true`).
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Reads fields out of one identifier's raw response, reporting missing paths
pub struct FieldReader<'a> {
    service: &'static str,
    identifier: &'a str,
    raw: &'a Value,
}

impl<'a> FieldReader<'a> {
    pub fn new(service: &'static str, identifier: &'a str, raw: &'a Value) -> Self {
        Self {
            service,
            identifier,
            raw,
        }
    }

    /// Read `path`, warning when it is absent
    pub fn field(&self, path: &[&str]) -> Field<'a> {
        let field = json_path(self.raw, path);
        if field.is_missing() {
            warn!(
                "{}: `{}` is not present in the response for {}",
                self.service,
                path.join("."),
                self.identifier
            );
        }
        field
    }

    /// Text of `path`, `None` when missing or empty
    pub fn text(&self, path: &[&str]) -> Option<String> {
        self.field(path).value().map(value_to_text)
    }

    /// Text of `path`, `sentinel` when empty, `None` when missing
    pub fn text_or(&self, path: &[&str], sentinel: &str) -> Option<String> {
        match self.field(path) {
            Field::Missing => None,
            Field::Empty => Some(sentinel.to_string()),
            Field::Present(v) => Some(value_to_text(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_path() {
        let raw = json!({
            "net": {
                "orgRef": {"@name": "Google LLC"},
                "comment": "",
                "blocks": [{"start": "8.8.8.0"}],
                "score": 0,
                "flag": false
            }
        });

        assert_eq!(
            json_path(&raw, &["net", "orgRef", "@name"]),
            Field::Present(&json!("Google LLC"))
        );
        assert_eq!(json_path(&raw, &["net", "comment"]), Field::Empty);
        assert_eq!(json_path(&raw, &["net", "missing"]), Field::Missing);
        assert_eq!(json_path(&raw, &["net", "orgRef", "@name", "x"]), Field::Missing);
        assert_eq!(
            json_path(&raw, &["net", "blocks", "0", "start"]),
            Field::Present(&json!("8.8.8.0"))
        );
        assert_eq!(json_path(&raw, &["net", "blocks", "1"]), Field::Missing);
        // zero and false are values, not absences
        assert_eq!(json_path(&raw, &["net", "score"]), Field::Present(&json!(0)));
        assert_eq!(json_path(&raw, &["net", "flag"]), Field::Present(&json!(false)));
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!("US")), "US");
        assert_eq!(value_to_text(&json!(37.751)), "37.751");
        assert_eq!(value_to_text(&json!(true)), "true");
        assert_eq!(value_to_text(&json!(["a.example", "b.example"])), "a.example, b.example");
    }

    #[test]
    fn test_reader() {
        let raw = json!({"address": "", "country": "US"});
        let reader = FieldReader::new("vendor", "00:00:00:00:00:00", &raw);

        assert_eq!(reader.text(&["country"]), Some("US".to_string()));
        assert_eq!(reader.text(&["address"]), None);
        assert_eq!(
            reader.text_or(&["address"], "address unavailable"),
            Some("address unavailable".to_string())
        );
        assert_eq!(reader.text_or(&["company"], "unavailable"), None);
    }
}
