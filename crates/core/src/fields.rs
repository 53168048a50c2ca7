//! Field extraction for HiBob job ad records
//!
//! The hiring API is inconsistent about how it encodes a field. The same
//! logical value may arrive as any of:
//!
//! - `{"/jobAd/title": {"value": "Engineer"}}`
//! - `{"/jobAd/location": {"name": "Remote"}}`
//! - `{"/jobAd/title": "Engineer"}`
//! - `{"/jobAd/title": ["Engineer"]}`
//!
//! and detail responses sometimes use plain keys (`title`) instead of paths.
//! [`extract`] is the only place that knows about these shapes. It never fails:
//! a missing or unexpected shape is simply `None`.

use serde::Serialize;
use serde_json::Value;

/// A scalar JSON value. Objects, arrays and `null` never make it here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl Scalar {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Text(s) => write!(f, "{s}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Resolve a field from a job ad record.
///
/// Resolution order, first match wins:
///
/// 1. `record[path].value`
/// 2. `record[path].name`
/// 3. `record[fallback_key]`
/// 4. `record[fallback_key].value`, then `record[fallback_key].name`
/// 5. `record[path]`
/// 6. `record[path][0]`
///
/// Every step only matches a scalar.
pub fn extract(record: &Value, path: &str, fallback_key: Option<&str>) -> Option<Scalar> {
    let at_path = record.get(path);
    let at_fallback = fallback_key.and_then(|key| record.get(key));

    let candidates = [
        at_path.and_then(|v| v.get("value")),
        at_path.and_then(|v| v.get("name")),
        at_fallback,
        at_fallback.and_then(|v| v.get("value")),
        at_fallback.and_then(|v| v.get("name")),
        at_path,
        at_path.and_then(|v| v.get(0)),
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(Scalar::from_value)
}

/// [`extract`] rendered as trimmed text, with blank values treated as absent.
pub fn extract_text(record: &Value, path: &str, fallback_key: Option<&str>) -> Option<String> {
    extract(record, path, fallback_key)
        .map(|scalar| scalar.to_string().trim().to_string())
        .filter(|text| !text.is_empty())
}
