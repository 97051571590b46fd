//! Error types for `fortune-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A profile operation was called without a usable user id.
  #[error("user id is required")]
  MissingUserId,

  /// A conditional write kept losing to concurrent writers.
  #[error("too many concurrent writes to {collection}/{id}")]
  Contention {
    collection: &'static str,
    id:         String,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Opaque failure from the document store backend.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
