//! Small helper for storing serde-tagged enums as plain `text` columns:
//! reuses each type's `#[serde(rename_all = "snake_case")]` string form
//! instead of hand-writing a parallel `Display`/`FromStr` per enum.

use serde::{de::DeserializeOwned, Serialize};

pub fn to_text<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        other => other.map(|v| v.to_string()).unwrap_or_default(),
    }
}

pub fn from_text<T: DeserializeOwned>(s: &str) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
}
