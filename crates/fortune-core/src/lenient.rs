//! Fail-soft `deserialize_with` helpers for patch and payload bodies.
//!
//! Callers send loosely-typed JSON. A malformed value never rejects the whole
//! body: it deserialises to `None`, and the merge then keeps the stored value
//! (or falls back to zero).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce a JSON value to an integer. Floats are truncated; numeric strings
/// are parsed.
pub fn coerce_i64(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n.as_i64().or_else(|| {
      n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)
    }),
    Value::String(s) => s
      .trim()
      .parse::<f64>()
      .ok()
      .filter(|f| f.is_finite())
      .map(|f| f.trunc() as i64),
    _ => None,
  }
}

/// Coerce a JSON value to a finite float.
pub fn coerce_f64(value: &Value) -> Option<f64> {
  let parsed = match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  };
  parsed.filter(|f| f.is_finite())
}

pub fn int<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<Value>::deserialize(de)?;
  Ok(raw.as_ref().and_then(coerce_i64))
}

pub fn float<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<Value>::deserialize(de)?;
  Ok(raw.as_ref().and_then(coerce_f64))
}

/// Only a literal JSON `true` counts; anything else is `false`.
pub fn flag<'de, D>(de: D) -> Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<Value>::deserialize(de)?;
  Ok(matches!(raw, Some(Value::Bool(true))))
}

/// Strings pass through; numbers and booleans are stringified; anything else
/// is dropped.
pub fn text<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<Value>::deserialize(de)?;
  Ok(raw.and_then(scalar_text))
}

/// Stringify a scalar the way [`text`] does.
fn scalar_text(value: Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

/// A JSON object of string values. Numeric and boolean values are
/// stringified, other entries are skipped, and a non-object is absent.
pub fn string_map<'de, D>(de: D) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<Value>::deserialize(de)?;
  Ok(match raw {
    Some(Value::Object(entries)) => Some(
      entries
        .into_iter()
        .filter_map(|(k, v)| scalar_text(v).map(|v| (k, v)))
        .collect(),
    ),
    _ => None,
  })
}

/// JSON arrays pass through; any other value is treated as absent.
pub fn list<'de, D>(de: D) -> Result<Option<Vec<Value>>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<Value>::deserialize(de)?;
  Ok(match raw {
    Some(Value::Array(items)) => Some(items),
    _ => None,
  })
}

/// RFC 3339 strings or epoch milliseconds; anything unparseable is dropped.
pub fn timestamp<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<Value>::deserialize(de)?;
  Ok(match raw {
    Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
      .ok()
      .map(|dt| dt.with_timezone(&Utc)),
    Some(v @ Value::Number(_)) => {
      coerce_i64(&v).and_then(DateTime::from_timestamp_millis)
    }
    _ => None,
  })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[derive(Debug, Deserialize)]
  struct Probe {
    #[serde(default, deserialize_with = "int")]
    n: Option<i64>,
    #[serde(default, deserialize_with = "float")]
    f: Option<f64>,
    #[serde(default, deserialize_with = "flag")]
    b: bool,
  }

  fn probe(v: Value) -> Probe { serde_json::from_value(v).unwrap() }

  #[test]
  fn numeric_strings_are_accepted() {
    let p = probe(json!({ "n": "42", "f": " 12.5 " }));
    assert_eq!(p.n, Some(42));
    assert_eq!(p.f, Some(12.5));
  }

  #[test]
  fn floats_truncate_to_integers() {
    assert_eq!(probe(json!({ "n": 7.9 })).n, Some(7));
    assert_eq!(probe(json!({ "n": -2.5 })).n, Some(-2));
  }

  #[test]
  fn garbage_degrades_to_none() {
    let p = probe(json!({ "n": "lots", "f": [1, 2], "b": "yes" }));
    assert_eq!(p.n, None);
    assert_eq!(p.f, None);
    assert!(!p.b);
  }

  #[test]
  fn missing_and_null_fields_are_absent() {
    let p = probe(json!({ "n": null }));
    assert_eq!(p.n, None);
    assert_eq!(p.f, None);
    assert!(!p.b);
  }

  #[test]
  fn timestamps_accept_rfc3339_and_epoch_millis() {
    #[derive(Deserialize)]
    struct At {
      #[serde(default, deserialize_with = "timestamp")]
      at: Option<DateTime<Utc>>,
    }
    let parse = |v: Value| serde_json::from_value::<At>(v).unwrap().at;

    let rfc = parse(json!({ "at": "2024-02-10T12:00:00+08:00" })).unwrap();
    assert_eq!(rfc.to_rfc3339(), "2024-02-10T04:00:00+00:00");
    let millis = parse(json!({ "at": 1_700_000_000_000_i64 })).unwrap();
    assert_eq!(millis.timestamp(), 1_700_000_000);
    assert!(parse(json!({ "at": "last tuesday" })).is_none());
  }

  #[test]
  fn string_maps_keep_scalars_and_drop_the_rest() {
    #[derive(Deserialize)]
    struct Labels {
      #[serde(default, deserialize_with = "string_map")]
      labels: Option<BTreeMap<String, String>>,
    }
    let parse = |v: Value| serde_json::from_value::<Labels>(v).unwrap().labels;

    let labels = parse(json!({ "labels": { "a": "x", "b": 0.08, "c": [1], "d": null } })).unwrap();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels["a"], "x");
    assert_eq!(labels["b"], "0.08");
    assert!(parse(json!({ "labels": "oops" })).is_none());
    assert!(parse(json!({ "labels": 3 })).is_none());
  }

  #[test]
  fn only_literal_true_sets_a_flag() {
    assert!(probe(json!({ "b": true })).b);
    assert!(!probe(json!({ "b": 1 })).b);
    assert!(!probe(json!({ "b": false })).b);
  }
}
