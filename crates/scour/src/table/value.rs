//! Cell values and the numeric/categorical classification shared by
//! detection and binning.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label used for the categorical placeholder bin that collects null and NaN.
pub const NAN_LABEL: &str = "NaN";

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A number. NaN is representable and is *not* numeric for binning.
    Number(f64),
    /// Free text, stored untrimmed.
    Text(String),
    /// A boolean.
    Bool(bool),
    /// No value.
    #[default]
    Null,
}

/// Run-time kind of a value, used for majority-type mismatch detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Number,
    String,
    Boolean,
    Null,
}

impl ValueKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Null => "null",
        }
    }
}

impl Value {
    /// Decode a raw delimited-file cell.
    ///
    /// Exactly empty cells become `Null`, numbers and `true`/`false` are typed,
    /// everything else stays as untrimmed text.
    pub fn parse_cell(raw: &str) -> Self {
        if raw.is_empty() {
            return Value::Null;
        }

        let trimmed = raw.trim();
        if trimmed == "NaN" {
            return Value::Number(f64::NAN);
        }
        if let Ok(num) = trimmed.parse::<f64>() {
            // Rust also accepts "inf" and "infinity"; those stay text.
            if num.is_finite() {
                return Value::Number(num);
            }
        }

        match trimmed {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Text(raw.to_string()),
        }
    }

    /// Convert a JSON value, keeping nested structures as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }

    /// Run-time kind. NaN still reports `Number`.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Null => ValueKind::Null,
        }
    }

    /// True for numbers that are not NaN.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Number(n) if !n.is_nan())
    }

    /// The numeric value, if [`Value::is_numeric`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    /// The text content, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True for `Null` and NaN.
    pub fn is_null_like(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Category label for non-numeric values: trimmed text, stringified
    /// booleans, and the NaN placeholder for null and NaN.
    pub fn category_label(&self) -> String {
        match self {
            Value::Text(s) => s.trim().to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => NAN_LABEL.to_string(),
            Value::Number(n) if n.is_nan() => NAN_LABEL.to_string(),
            Value::Number(n) => format_number(*n),
        }
    }

    /// Canonical key used to de-duplicate values.
    ///
    /// Numbers key by their [`format_number`] text, so `-0.0` and `0.0` share
    /// a key and every NaN shares one.
    pub(crate) fn dedup_key(&self) -> String {
        match self {
            Value::Number(n) if n.is_nan() => "n:NaN".to_string(),
            Value::Number(n) => format!("n:{}", format_number(*n)),
            Value::Text(s) => format!("t:{}", s),
            Value::Bool(b) => format!("b:{}", b),
            Value::Null => "null".to_string(),
        }
    }
}

/// Format a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell() {
        assert_eq!(Value::parse_cell(""), Value::Null);
        assert_eq!(Value::parse_cell("42"), Value::Number(42.0));
        assert_eq!(Value::parse_cell(" 3.5 "), Value::Number(3.5));
        assert_eq!(Value::parse_cell("true"), Value::Bool(true));
        assert_eq!(Value::parse_cell(" "), Value::Text(" ".to_string()));
        assert_eq!(Value::parse_cell("inf"), Value::Text("inf".to_string()));
        assert!(matches!(Value::parse_cell("NaN"), Value::Number(n) if n.is_nan()));
    }

    #[test]
    fn test_classification() {
        assert!(Value::Number(1.0).is_numeric());
        assert!(!Value::Number(f64::NAN).is_numeric());
        assert_eq!(Value::Number(f64::NAN).kind(), ValueKind::Number);
        assert!(!Value::Text("5".to_string()).is_numeric());
        assert_eq!(Value::Bool(true).category_label(), "true");
        assert_eq!(Value::Null.category_label(), NAN_LABEL);
        assert_eq!(Value::Text("  a ".to_string()).category_label(), "a");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-2.5), "-2.5");
    }

    #[test]
    fn test_dedup_key() {
        assert_eq!(Value::Number(-0.0).dedup_key(), Value::Number(0.0).dedup_key());
        assert_eq!(Value::Number(f64::NAN).dedup_key(), Value::Number(-f64::NAN).dedup_key());
        assert_ne!(Value::Number(1.0).dedup_key(), Value::Text("1".to_string()).dedup_key());
        assert_ne!(Value::Null.dedup_key(), Value::Number(f64::NAN).dedup_key());
    }

    #[test]
    fn test_json_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[1, "a", true, null]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Number(1.0),
                Value::Text("a".to_string()),
                Value::Bool(true),
                Value::Null
            ]
        );
    }
}
