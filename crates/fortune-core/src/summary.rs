//! Cross-profile rollup for the rewards dashboard.

use serde::{Deserialize, Serialize};

use crate::{
  catalog::Catalog,
  ledger::{Winner, WinnerLedger},
  profile::RewardProfile,
  progress::build_set_progress,
  settings::RewardSettings,
};

/// How many winners the summary carries.
pub const RECENT_WINNERS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSummary {
  pub total_players:    usize,
  pub total_points:     u64,
  /// Profiles with `streak_days > 0`.
  pub active_streaks:   usize,
  pub instant_wins:     u64,
  pub completed_sets:   usize,
  /// Sets with partial progress, summed over profiles.
  pub active_sets:      usize,
  pub collected_pieces: usize,
  pub budget_pool:      f64,
  pub recent_winners:   Vec<Winner>,
}

/// Fold every profile into a [`RewardSummary`], deriving set progress for
/// each one from scratch.
pub fn summarize<'a>(
  catalog: &Catalog,
  profiles: impl IntoIterator<Item = &'a RewardProfile>,
  settings: &RewardSettings,
  winners: &WinnerLedger,
) -> RewardSummary {
  let mut summary = profiles.into_iter().fold(
    RewardSummary::default(),
    |mut acc, profile| {
      let sets = build_set_progress(catalog, &profile.inventory);
      acc.total_players += 1;
      acc.total_points = acc.total_points.saturating_add(profile.points);
      acc.active_streaks += usize::from(profile.streak_days > 0);
      acc.instant_wins = acc.instant_wins.saturating_add(profile.instant_wins);
      acc.completed_sets += sets.iter().filter(|s| s.is_complete).count();
      acc.active_sets += sets.iter().filter(|s| s.is_active).count();
      acc.collected_pieces +=
        sets.iter().map(|s| s.collected_count).sum::<usize>();
      acc
    },
  );
  summary.budget_pool = settings.budget_pool();
  summary.recent_winners = winners.recent(RECENT_WINNERS).to_vec();
  summary
}
