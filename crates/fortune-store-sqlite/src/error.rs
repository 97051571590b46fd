//! Error type for `fortune-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored revision does not fit the in-memory counter.
  #[error("invalid revision {0} for {1}")]
  Revision(i64, String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
