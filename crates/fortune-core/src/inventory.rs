//! Inventory entries, one per fortune-cookie reveal.
//!
//! An entry is an immutable fact: once it is prepended to a profile's
//! inventory it is never edited, only evicted by the retention cap.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Entry type ──────────────────────────────────────────────────────────────

/// What kind of reward a reveal produced.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
  /// A piece of a collectible set.
  #[default]
  Collection,
  /// An immediate reward (free item, discount).
  Instant,
  /// Loyalty points only.
  Points,
}

impl EntryType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Collection => "collection",
      Self::Instant => "instant",
      Self::Points => "points",
    }
  }

  /// Lenient parse used for loosely-typed payloads.
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "collection" => Some(Self::Collection),
      "instant" => Some(Self::Instant),
      "points" => Some(Self::Points),
      _ => None,
    }
  }
}

// ─── Rarity ──────────────────────────────────────────────────────────────────

/// Rarity label. The vocabulary is open: marketing adds tiers without code
/// changes, so this stays a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rarity(pub String);

impl Rarity {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl Default for Rarity {
  fn default() -> Self { Self("common".to_owned()) }
}

impl From<&str> for Rarity {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for Rarity {
  fn from(s: String) -> Self { Self(s) }
}

impl fmt::Display for Rarity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// One reveal, as stored in a profile's inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
  pub id:             String,
  pub label:          String,
  #[serde(rename = "type")]
  pub entry_type:     EntryType,
  #[serde(default)]
  pub rarity:         Rarity,
  #[serde(default)]
  pub icon:           String,
  /// Only meaningful for [`EntryType::Collection`] entries.
  pub set_id:         Option<String>,
  pub piece_id:       Option<String>,
  pub reward_outcome: Option<String>,
  pub fortune:        Option<String>,
  pub call_to_action: Option<String>,
  pub progress_note:  Option<String>,
  pub collected_at:   DateTime<Utc>,
  pub expires_at:     Option<DateTime<Utc>>,
}

impl InventoryEntry {
  /// The `(set, piece)` this entry satisfies, if it carries both ids.
  pub fn slot(&self) -> Option<(&str, &str)> {
    match (self.set_id.as_deref(), self.piece_id.as_deref()) {
      (Some(set), Some(piece)) => Some((set, piece)),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn entry_type_parse_is_case_insensitive() {
    assert_eq!(EntryType::parse(" Instant "), Some(EntryType::Instant));
    assert_eq!(EntryType::parse("POINTS"), Some(EntryType::Points));
    assert_eq!(EntryType::parse("jackpot"), None);
  }

  #[test]
  fn entry_serialises_with_camel_case_and_type_tag() {
    let entry = InventoryEntry {
      id:             "e1".into(),
      label:          "Dragon Pearl".into(),
      entry_type:     EntryType::Collection,
      rarity:         "legendary".into(),
      icon:           "🐉".into(),
      set_id:         Some("dragon-dynasty".into()),
      piece_id:       Some("dragon-pearl".into()),
      reward_outcome: None,
      fortune:        None,
      call_to_action: None,
      progress_note:  None,
      collected_at:   Utc::now(),
      expires_at:     None,
    };
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["type"], "collection");
    assert_eq!(json["setId"], "dragon-dynasty");
    assert_eq!(json["rarity"], "legendary");
    assert_eq!(entry.slot(), Some(("dragon-dynasty", "dragon-pearl")));
  }
}
