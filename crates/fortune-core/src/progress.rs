//! Set-progress calculator.
//!
//! Progress is a read model: it is derived from a profile's inventory on every
//! read and never stored, so it cannot go stale.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  catalog::{Catalog, FortuneSet},
  inventory::{EntryType, InventoryEntry, Rarity},
};

// ─── Read model ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceStatus {
  Collected,
  Missing,
}

/// A catalog piece annotated with what the player holds for it.
///
/// The entry-derived fields are taken from the most recently collected
/// matching entry and are all `None` for missing pieces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceProgress {
  pub id:             String,
  pub label:          String,
  pub icon:           Option<String>,
  pub hint:           Option<String>,
  pub status:         PieceStatus,
  pub entry_id:       Option<String>,
  pub rarity:         Option<Rarity>,
  pub reward_outcome: Option<String>,
  pub fortune:        Option<String>,
  pub progress_note:  Option<String>,
  pub collected_at:   Option<DateTime<Utc>>,
  pub expires_at:     Option<DateTime<Utc>>,
  /// Matching entries beyond the first.
  pub duplicates:     usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetProgress {
  pub id:                String,
  pub name:              String,
  pub rarity:            Rarity,
  pub prize:             String,
  pub theme:             String,
  pub accent_color:      String,
  pub pieces:            Vec<PieceProgress>,
  pub collected_count:   usize,
  pub total_pieces:      usize,
  /// `collected_count / total_pieces`; `0.0` for an empty set.
  pub completion_rate:   f64,
  pub is_complete:       bool,
  /// Some, but not all, pieces collected.
  pub is_active:         bool,
  pub last_collected_at: Option<DateTime<Utc>>,
}

/// Counters over a whole inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
  pub total_reveals:     usize,
  pub collection_pieces: usize,
  pub instant_rewards:   usize,
  pub points_rewards:    usize,
  pub duplicates:        usize,
  pub completed_sets:    usize,
}

impl InventoryStats {
  pub fn compute(inventory: &[InventoryEntry], sets: &[SetProgress]) -> Self {
    let count =
      |t: EntryType| inventory.iter().filter(|e| e.entry_type == t).count();
    Self {
      total_reveals:     inventory.len(),
      collection_pieces: count(EntryType::Collection),
      instant_rewards:   count(EntryType::Instant),
      points_rewards:    count(EntryType::Points),
      duplicates:        sets
        .iter()
        .flat_map(|s| &s.pieces)
        .map(|p| p.duplicates)
        .sum(),
      completed_sets:    sets.iter().filter(|s| s.is_complete).count(),
    }
  }
}

// ─── Calculator ──────────────────────────────────────────────────────────────

type Slots<'a> = HashMap<&'a str, HashMap<&'a str, Vec<&'a InventoryEntry>>>;

/// Derive per-set completion from `inventory`, in catalog order.
///
/// Entries that reference sets or pieces missing from the catalog are
/// ignored. When several entries match a piece the one with the latest
/// `collected_at` wins; on an exact tie the one earlier in `inventory`
/// (i.e. more recently inserted) wins.
pub fn build_set_progress(
  catalog: &Catalog,
  inventory: &[InventoryEntry],
) -> Vec<SetProgress> {
  let mut slots: Slots<'_> = HashMap::new();
  for entry in inventory {
    if let Some((set_id, piece_id)) = entry.slot() {
      slots
        .entry(set_id)
        .or_default()
        .entry(piece_id)
        .or_default()
        .push(entry);
    }
  }

  catalog
    .sets
    .iter()
    .map(|set| set_progress(set, slots.get(set.id.as_str())))
    .collect()
}

fn set_progress(
  set: &FortuneSet,
  matches: Option<&HashMap<&str, Vec<&InventoryEntry>>>,
) -> SetProgress {
  let pieces: Vec<PieceProgress> = set
    .pieces
    .iter()
    .map(|piece| {
      let found = matches
        .and_then(|m| m.get(piece.id.as_str()))
        .map(Vec::as_slice)
        .unwrap_or_default();
      let latest = latest_entry(found);

      PieceProgress {
        id:             piece.id.clone(),
        label:          piece.label.clone(),
        icon:           piece.icon.clone(),
        hint:           piece.hint.clone(),
        status:         if latest.is_some() {
          PieceStatus::Collected
        } else {
          PieceStatus::Missing
        },
        entry_id:       latest.map(|e| e.id.clone()),
        rarity:         latest.map(|e| e.rarity.clone()),
        reward_outcome: latest.and_then(|e| e.reward_outcome.clone()),
        fortune:        latest.and_then(|e| e.fortune.clone()),
        progress_note:  latest.and_then(|e| e.progress_note.clone()),
        collected_at:   latest.map(|e| e.collected_at),
        expires_at:     latest.and_then(|e| e.expires_at),
        duplicates:     found.len().saturating_sub(1),
      }
    })
    .collect();

  let total_pieces = pieces.len();
  let collected_count = pieces
    .iter()
    .filter(|p| p.status == PieceStatus::Collected)
    .count();
  let completion_rate = if total_pieces == 0 {
    0.0
  } else {
    collected_count as f64 / total_pieces as f64
  };
  let last_collected_at = pieces.iter().filter_map(|p| p.collected_at).max();

  SetProgress {
    id: set.id.clone(),
    name: set.name.clone(),
    rarity: set.rarity.clone(),
    prize: set.prize.clone(),
    theme: set.theme.clone(),
    accent_color: set.accent_color.clone(),
    pieces,
    collected_count,
    total_pieces,
    completion_rate,
    is_complete: total_pieces > 0 && collected_count == total_pieces,
    is_active: collected_count > 0 && collected_count < total_pieces,
    last_collected_at,
  }
}

/// Latest by `collected_at`; strict comparison keeps the first on ties.
fn latest_entry<'a>(found: &[&'a InventoryEntry]) -> Option<&'a InventoryEntry> {
  let mut best: Option<&'a InventoryEntry> = None;
  for &entry in found {
    match best {
      Some(b) if entry.collected_at <= b.collected_at => {}
      _ => best = Some(entry),
    }
  }
  best
}
