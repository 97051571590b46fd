//! SQL schema for the fortune SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document. Writes are conditional on `revision`, which starts
-- at 1 and is bumped by every replace.
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT    NOT NULL,
    doc_id      TEXT    NOT NULL,
    revision    INTEGER NOT NULL DEFAULT 1,
    body        TEXT    NOT NULL,   -- JSON document
    updated_at  TEXT    NOT NULL,   -- ISO 8601 UTC
    PRIMARY KEY (collection, doc_id)
);

PRAGMA user_version = 1;
";
