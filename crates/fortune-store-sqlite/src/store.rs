//! [`SqliteStore`], the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use fortune_core::store::{Document, DocumentStore};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{RawDocument, encode_dt, encode_revision},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("document schema ready");
    Ok(())
  }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDocument> {
  Ok(RawDocument {
    doc_id:     row.get(0)?,
    revision:   row.get(1)?,
    body:       row.get(2)?,
    updated_at: row.get(3)?,
  })
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Document>> {
    let collection = collection.to_owned();
    let id         = id.to_owned();

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT doc_id, revision, body, updated_at FROM documents
             WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![collection, id],
            read_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn insert_one(
    &self,
    collection: &str,
    id:         &str,
    body:       serde_json::Value,
  ) -> Result<bool> {
    let collection = collection.to_owned();
    let id         = id.to_owned();
    let body_str   = body.to_string();
    let at_str     = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO documents (collection, doc_id, revision, body, updated_at)
           VALUES (?1, ?2, 1, ?3, ?4)",
          rusqlite::params![collection, id, body_str, at_str],
        )?;
        Ok(changed == 1)
      })
      .await?;

    Ok(inserted)
  }

  async fn replace_one(
    &self,
    collection:        &str,
    id:                &str,
    body:              serde_json::Value,
    expected_revision: u64,
  ) -> Result<bool> {
    let Some(expected) = encode_revision(expected_revision) else {
      return Ok(false);
    };
    let collection = collection.to_owned();
    let id         = id.to_owned();
    let body_str   = body.to_string();
    let at_str     = encode_dt(Utc::now());

    let replaced = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE documents
           SET body = ?1, revision = revision + 1, updated_at = ?2
           WHERE collection = ?3 AND doc_id = ?4 AND revision = ?5",
          rusqlite::params![body_str, at_str, collection, id, expected],
        )?;
        Ok(changed == 1)
      })
      .await?;

    Ok(replaced)
  }

  async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
    let collection = collection.to_owned();

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT doc_id, revision, body, updated_at FROM documents
           WHERE collection = ?1
           ORDER BY doc_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![collection], read_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }
}
