//! The `DocumentStore` trait and the collection names the engine uses.
//!
//! The trait is implemented by storage backends (e.g. `fortune-store-sqlite`).
//! The engine depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Collections ─────────────────────────────────────────────────────────────

/// Collection names and the fixed ids of singleton documents.
pub mod collections {
  pub const SETTINGS: &str = "dannyswok_reward_settings";
  pub const AUTOMATION: &str = "dannyswok_reward_automation";
  pub const PROFILES: &str = "dannyswok_reward_profiles";
  pub const WINNERS: &str = "dannyswok_reward_winners";
  pub const EVENTS: &str = "dannyswok_reward_events";

  pub const SETTINGS_ID: &str = "settings";
  pub const AUTOMATION_ID: &str = "automation";
  pub const WINNERS_ID: &str = "winners";
  pub const EVENTS_ID: &str = "events";
}

// ─── Document ────────────────────────────────────────────────────────────────

/// A stored JSON document with its write revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
  pub id:         String,
  /// Starts at 1 on insert and increases by one on every replace.
  pub revision:   u64,
  pub body:       serde_json::Value,
  pub updated_at: DateTime<Utc>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a collection-of-documents backend.
///
/// Writes are conditional: an insert never overwrites, and a replace only
/// lands if the caller saw the current revision. Callers build
/// read-modify-write cycles on top of that.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch one document by id. Returns `None` if not found.
  fn find_one<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Insert `body` at revision 1.
  ///
  /// Returns `false`, writing nothing, if `id` already exists.
  fn insert_one<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
    body: serde_json::Value,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Replace the body of `id` if its stored revision is still
  /// `expected_revision`, bumping the revision.
  ///
  /// Returns `false`, writing nothing, on a revision mismatch or when the
  /// document does not exist.
  fn replace_one<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
    body: serde_json::Value,
    expected_revision: u64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Every document in `collection`, ordered by id.
  fn find_all<'a>(
    &'a self,
    collection: &'a str,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;
}
