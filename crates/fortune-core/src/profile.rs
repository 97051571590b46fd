//! Reward profiles and the merge rules applied by reveal and streak writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  catalog::Catalog,
  inventory::{EntryType, InventoryEntry},
  lenient,
  progress::{InventoryStats, SetProgress, build_set_progress},
};

/// Inventory retention when a reveal does not name its own `keepLatest`.
pub const DEFAULT_KEEP_LATEST: usize = 60;

// ─── Profile ─────────────────────────────────────────────────────────────────

/// Per-user reward state. Created lazily, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardProfile {
  pub user_id:             String,
  pub points:              u64,
  pub next_tier:           u64,
  pub streak_days:         u64,
  pub instant_wins:        u64,
  pub streak_bonus:        String,
  pub last_instant_reward: String,
  /// Most recent first.
  pub inventory:           Vec<InventoryEntry>,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

impl RewardProfile {
  /// The default template: zeroed counters and an empty inventory.
  pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
    Self {
      user_id:             user_id.into(),
      points:              0,
      next_tier:           0,
      streak_days:         0,
      instant_wins:        0,
      streak_bonus:        "Visit two days in a row to start a streak".to_owned(),
      last_instant_reward: "No instant wins yet".to_owned(),
      inventory:           Vec::new(),
      created_at:          now,
      updated_at:          now,
    }
  }

  /// Prepend `entry` and apply the counter side effects carried by
  /// `payload`.
  pub fn record_reveal(
    &mut self,
    entry: InventoryEntry,
    payload: &RevealPayload,
    keep_latest: usize,
    now: DateTime<Utc>,
  ) {
    let instant =
      payload.instant_win || entry.entry_type == EntryType::Instant;
    let outcome = entry.reward_outcome.clone();

    self.inventory.insert(0, entry);
    self.inventory.truncate(keep_latest.max(1));

    if let Some(delta) = payload.points_awarded {
      self.points = apply_delta(self.points, delta);
    }
    if let Some(tier) = payload.next_tier {
      self.next_tier = clamp_non_negative(tier);
    }
    if instant {
      self.instant_wins += 1;
      if let Some(label) = payload.instant_reward_label.clone().or(outcome) {
        self.last_instant_reward = label;
      }
    }

    self.apply_streak(&payload.streak());
    self.touch(now);
  }

  /// Streak merge: reset beats increment, increment beats an explicit value.
  pub fn apply_streak(&mut self, update: &StreakUpdate) {
    if update.reset {
      self.streak_days = 0;
    } else if let Some(delta) = update.increment {
      self.streak_days = apply_delta(self.streak_days, delta);
    } else if let Some(value) = update.value {
      self.streak_days = clamp_non_negative(value);
    }
    if let Some(bonus) = &update.bonus {
      self.streak_bonus = bonus.clone();
    }
  }

  /// Bump `updated_at`, never moving it backwards.
  pub fn touch(&mut self, now: DateTime<Utc>) {
    self.updated_at = self.updated_at.max(now);
  }
}

fn apply_delta(current: u64, delta: i64) -> u64 {
  if delta >= 0 {
    current.saturating_add(delta.unsigned_abs())
  } else {
    current.saturating_sub(delta.unsigned_abs())
  }
}

fn clamp_non_negative(value: i64) -> u64 { value.max(0).unsigned_abs() }

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Body of a reveal. Every field is optional and leniently parsed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevealPayload {
  #[serde(deserialize_with = "lenient::text")]
  pub id:                   Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub label:                Option<String>,
  #[serde(rename = "type", deserialize_with = "lenient::text")]
  pub entry_type:           Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub rarity:               Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub icon:                 Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub set_id:               Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub piece_id:             Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub reward_outcome:       Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub fortune:              Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub call_to_action:       Option<String>,
  #[serde(deserialize_with = "lenient::text")]
  pub progress_note:        Option<String>,
  #[serde(deserialize_with = "lenient::timestamp")]
  pub collected_at:         Option<DateTime<Utc>>,
  #[serde(deserialize_with = "lenient::timestamp")]
  pub expires_at:           Option<DateTime<Utc>>,

  #[serde(deserialize_with = "lenient::int")]
  pub keep_latest:          Option<i64>,
  /// Signed delta; `points` saturates at zero.
  #[serde(deserialize_with = "lenient::int")]
  pub points_awarded:       Option<i64>,
  #[serde(deserialize_with = "lenient::int")]
  pub next_tier:            Option<i64>,
  #[serde(deserialize_with = "lenient::flag")]
  pub instant_win:          bool,
  #[serde(deserialize_with = "lenient::text")]
  pub instant_reward_label: Option<String>,

  #[serde(deserialize_with = "lenient::flag")]
  pub streak_reset:         bool,
  #[serde(deserialize_with = "lenient::int")]
  pub streak_increment:     Option<i64>,
  #[serde(deserialize_with = "lenient::int")]
  pub streak_days:          Option<i64>,
  #[serde(deserialize_with = "lenient::text")]
  pub streak_bonus:         Option<String>,
}

impl RevealPayload {
  /// A collection reveal for `(set_id, piece_id)`.
  pub fn piece(set_id: impl Into<String>, piece_id: impl Into<String>) -> Self {
    Self {
      entry_type: Some(EntryType::Collection.as_str().to_owned()),
      set_id: Some(set_id.into()),
      piece_id: Some(piece_id.into()),
      ..Self::default()
    }
  }

  /// Unrecognised types fall back to `collection` when the payload names a
  /// set piece and to `points` otherwise.
  pub fn resolved_type(&self) -> EntryType {
    self
      .entry_type
      .as_deref()
      .and_then(EntryType::parse)
      .unwrap_or(if has_text(&self.set_id) && has_text(&self.piece_id) {
        EntryType::Collection
      } else {
        EntryType::Points
      })
  }

  /// Build the immutable inventory entry, filling a fresh id and `now` for
  /// the collection time when absent.
  pub fn build_entry(&self, now: DateTime<Utc>) -> InventoryEntry {
    let entry_type = self.resolved_type();
    let non_empty = |s: &Option<String>| s.clone().filter(|s| !s.trim().is_empty());

    InventoryEntry {
      id: non_empty(&self.id).unwrap_or_else(|| Uuid::new_v4().to_string()),
      label: non_empty(&self.label)
        .or_else(|| non_empty(&self.reward_outcome))
        .or_else(|| non_empty(&self.piece_id))
        .unwrap_or_else(|| "Fortune cookie".to_owned()),
      entry_type,
      rarity: non_empty(&self.rarity).map(Into::into).unwrap_or_default(),
      icon: self.icon.clone().unwrap_or_default(),
      set_id: non_empty(&self.set_id),
      piece_id: non_empty(&self.piece_id),
      reward_outcome: self.reward_outcome.clone(),
      fortune: self.fortune.clone(),
      call_to_action: self.call_to_action.clone(),
      progress_note: self.progress_note.clone(),
      collected_at: self.collected_at.unwrap_or(now),
      expires_at: self.expires_at,
    }
  }

  /// Retention cap for this reveal; non-positive values use `default`.
  pub fn keep_latest(&self, default: usize) -> usize {
    match self.keep_latest {
      Some(k) if k > 0 => usize::try_from(k).unwrap_or(usize::MAX),
      _ => default,
    }
  }

  pub fn streak(&self) -> StreakUpdate {
    StreakUpdate {
      reset:     self.streak_reset,
      increment: self.streak_increment,
      value:     self.streak_days,
      bonus:     self.streak_bonus.clone(),
    }
  }
}

fn has_text(s: &Option<String>) -> bool {
  s.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Body of a streak-only update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreakUpdate {
  #[serde(deserialize_with = "lenient::flag")]
  pub reset:     bool,
  #[serde(deserialize_with = "lenient::int")]
  pub increment: Option<i64>,
  #[serde(deserialize_with = "lenient::int")]
  pub value:     Option<i64>,
  #[serde(deserialize_with = "lenient::text")]
  pub bonus:     Option<String>,
}

// ─── Read model ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
  pub last_reveal_at: Option<DateTime<Utc>>,
  pub updated_at:     DateTime<Utc>,
}

/// A profile together with everything derived from its inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
  #[serde(flatten)]
  pub profile:   RewardProfile,
  pub sets:      Vec<SetProgress>,
  pub stats:     InventoryStats,
  pub telemetry: Telemetry,
}

impl ProfileView {
  pub fn build(profile: RewardProfile, catalog: &Catalog) -> Self {
    let sets = build_set_progress(catalog, &profile.inventory);
    let stats = InventoryStats::compute(&profile.inventory, &sets);
    let telemetry = Telemetry {
      last_reveal_at: profile.inventory.iter().map(|e| e.collected_at).max(),
      updated_at:     profile.updated_at,
    };
    Self { profile, sets, stats, telemetry }
  }
}
