//! Row shapes exchanged with clients and the datastore.
//!
//! Timestamps travel as strings: normally canonical RFC 3339, but a lenient
//! ingest may carry the raw text of an unparseable input through unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One point as submitted by a client, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPoint {
    pub metric_name: String,
    /// Free-form timestamp (string or epoch seconds).
    pub ts: Value,
    /// Free-form value; non-string scalars are kept as their JSON text.
    pub value: Value,
}

/// A normalized point, as written to and read from the `timeseries` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeseriesPoint {
    #[serde(default, deserialize_with = "scalar_string")]
    pub metric_name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub ts: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: String,
}

/// One row of the `metadata` table. Written once per metric, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricMetadata {
    #[serde(deserialize_with = "scalar_string")]
    pub metric_name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub first_seen: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub first_seen_value: String,
}

/// Render a JSON scalar as text. Strings are taken verbatim, `null` is empty.
pub fn scalar_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn scalar_string<'de, D>(d: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(scalar_to_string(&v))
}
