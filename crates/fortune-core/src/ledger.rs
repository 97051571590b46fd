//! Winners ledger and campaign event lists (singleton documents).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::lenient;

/// Oldest winners beyond this many are dropped.
pub const WINNER_LEDGER_CAP: usize = 25;

// ─── Winners ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
  pub id:           String,
  pub user_id:      Option<String>,
  pub prize:        String,
  /// Prize flavour, e.g. `"grand"` or `"instant"`.
  pub variant:      Option<String>,
  pub announced_at: DateTime<Utc>,
  pub location:     Option<String>,
  /// URL of the social share card, if one was rendered.
  pub share_card:   Option<String>,
}

/// Input to `add_winner`; `id` and `announcedAt` default to a fresh UUID and
/// the current time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewWinner {
  #[serde(deserialize_with = "lenient::text")]
  pub id:           Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub user_id:      Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub prize:        Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub variant:      Option<String>,
  #[serde(deserialize_with = "lenient::timestamp")]
  pub announced_at: Option<DateTime<Utc>>,
  #[serde(deserialize_with = "lenient::text")]
  pub location:     Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub share_card:   Option<String>,
}

impl NewWinner {
  pub fn into_winner(self, now: DateTime<Utc>) -> Winner {
    Winner {
      id:           self
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string()),
      user_id:      self.user_id,
      prize:        self.prize.unwrap_or_default(),
      variant:      self.variant,
      announced_at: self.announced_at.unwrap_or(now),
      location:     self.location,
      share_card:   self.share_card,
    }
  }
}

/// Most recent first, at most [`WINNER_LEDGER_CAP`] entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerLedger {
  pub entries:    Vec<Winner>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl WinnerLedger {
  pub fn push(&mut self, winner: Winner, now: DateTime<Utc>) {
    self.entries.insert(0, winner);
    self.entries.truncate(WINNER_LEDGER_CAP);
    self.updated_at = Some(now);
  }

  pub fn recent(&self, n: usize) -> &[Winner] {
    &self.entries[..n.min(self.entries.len())]
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// Four independent campaign lists. Items are free-form objects owned by the
/// marketing dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RewardEvents {
  pub flash_events:      Vec<Value>,
  pub expiring_pieces:   Vec<Value>,
  pub streak_boosts:     Vec<Value>,
  pub marketing_moments: Vec<Value>,
  pub updated_at:        Option<DateTime<Utc>>,
}

/// Each supplied list replaces the stored one wholesale; omitted lists are
/// left alone. A list that is not a JSON array is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventsPatch {
  #[serde(deserialize_with = "lenient::list")]
  pub flash_events:      Option<Vec<Value>>,
  #[serde(deserialize_with = "lenient::list")]
  pub expiring_pieces:   Option<Vec<Value>>,
  #[serde(deserialize_with = "lenient::list")]
  pub streak_boosts:     Option<Vec<Value>>,
  #[serde(deserialize_with = "lenient::list")]
  pub marketing_moments: Option<Vec<Value>>,
}

impl RewardEvents {
  pub fn apply(&mut self, patch: EventsPatch, now: DateTime<Utc>) {
    let slots = [
      (&mut self.flash_events, patch.flash_events),
      (&mut self.expiring_pieces, patch.expiring_pieces),
      (&mut self.streak_boosts, patch.streak_boosts),
      (&mut self.marketing_moments, patch.marketing_moments),
    ];
    for (slot, replacement) in slots {
      if let Some(list) = replacement {
        *slot = list;
      }
    }
    self.updated_at = Some(now);
  }
}
