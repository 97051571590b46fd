//! Encoding and decoding helpers between core types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and document bodies as compact
//! JSON.

use chrono::{DateTime, Utc};
use fortune_core::store::Document;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Revision ────────────────────────────────────────────────────────────────

/// Revisions live in an `INTEGER` column. A revision too large for it can
/// never be stored, so callers treat `None` as "cannot match".
pub fn encode_revision(revision: u64) -> Option<i64> { i64::try_from(revision).ok() }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `documents` row.
pub struct RawDocument {
  pub doc_id:     String,
  pub revision:   i64,
  pub body:       String,
  pub updated_at: String,
}

impl RawDocument {
  pub fn into_document(self) -> Result<Document> {
    let revision = u64::try_from(self.revision)
      .map_err(|_| Error::Revision(self.revision, self.doc_id.clone()))?;

    Ok(Document {
      body: serde_json::from_str(&self.body)?,
      updated_at: decode_dt(&self.updated_at)?,
      revision,
      id: self.doc_id,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn negative_revision_is_rejected() {
    let raw = RawDocument {
      doc_id:     "u1".into(),
      revision:   -1,
      body:       "{}".into(),
      updated_at: encode_dt(Utc::now()),
    };
    assert!(matches!(raw.into_document(), Err(Error::Revision(-1, _))));
  }

  #[test]
  fn oversized_revision_does_not_encode() {
    assert_eq!(encode_revision(7), Some(7));
    assert_eq!(encode_revision(u64::MAX), None);
  }
}
