//! Reward budget settings (singleton document).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lenient;

/// Named odds descriptors, e.g. `"instant" → "1 in 12"`.
pub type Odds = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSettings {
  /// Share of the revenue baseline funding prizes, in `[0, 100]`.
  pub budget_percent:   f64,
  /// Revenue the budget is computed against, `>= 0`.
  pub revenue_baseline: f64,
  pub odds:             Odds,
  pub updated_at:       Option<DateTime<Utc>>,
}

impl Default for RewardSettings {
  fn default() -> Self {
    let odds = [
      ("collection", "1 in 3"),
      ("instant", "1 in 12"),
      ("points", "1 in 2"),
      ("grandPrize", "1 in 500"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect();

    Self {
      budget_percent: 5.0,
      revenue_baseline: 0.0,
      odds,
      updated_at: None,
    }
  }
}

impl RewardSettings {
  pub fn budget_pool(&self) -> f64 {
    self.budget_percent * self.revenue_baseline / 100.0
  }

  /// Merge `patch` field by field. `odds` entries overwrite per key; keys not
  /// in the patch survive.
  pub fn apply(&mut self, patch: &SettingsPatch, now: DateTime<Utc>) {
    if let Some(percent) = patch.budget_percent {
      self.budget_percent = percent.clamp(0.0, 100.0);
    }
    if let Some(baseline) = patch.revenue_baseline {
      self.revenue_baseline = baseline.max(0.0);
    }
    if let Some(odds) = &patch.odds {
      self
        .odds
        .extend(odds.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    self.updated_at = Some(now);
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
  #[serde(deserialize_with = "lenient::float")]
  pub budget_percent:   Option<f64>,
  #[serde(deserialize_with = "lenient::float")]
  pub revenue_baseline: Option<f64>,
  /// Non-string odds are stringified or skipped; a non-object is ignored.
  #[serde(deserialize_with = "lenient::string_map")]
  pub odds:             Option<Odds>,
}

/// Settings as returned to callers, with the pool computed at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
  #[serde(flatten)]
  pub settings:    RewardSettings,
  pub budget_pool: f64,
}

impl From<RewardSettings> for SettingsView {
  fn from(settings: RewardSettings) -> Self {
    Self { budget_pool: settings.budget_pool(), settings }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn patch(v: serde_json::Value) -> SettingsPatch {
    serde_json::from_value(v).unwrap()
  }

  #[test]
  fn budget_percent_is_clamped() {
    let mut s = RewardSettings::default();
    s.apply(&patch(json!({ "budgetPercent": 150 })), Utc::now());
    assert_eq!(s.budget_percent, 100.0);
    s.apply(&patch(json!({ "budgetPercent": -5 })), Utc::now());
    assert_eq!(s.budget_percent, 0.0);
  }

  #[test]
  fn negative_baseline_clamps_to_zero() {
    let mut s = RewardSettings::default();
    s.apply(&patch(json!({ "revenueBaseline": -1200 })), Utc::now());
    assert_eq!(s.revenue_baseline, 0.0);
  }

  #[test]
  fn malformed_numbers_keep_stored_values() {
    let mut s = RewardSettings { budget_percent: 12.0, ..Default::default() };
    s.apply(&patch(json!({ "budgetPercent": "lots" })), Utc::now());
    assert_eq!(s.budget_percent, 12.0);
  }

  #[test]
  fn odds_merge_per_key() {
    let mut s = RewardSettings::default();
    s.apply(
      &patch(json!({ "odds": { "instant": "1 in 8", "mystery": "1 in 40" } })),
      Utc::now(),
    );
    assert_eq!(s.odds["instant"], "1 in 8");
    assert_eq!(s.odds["mystery"], "1 in 40");
    assert_eq!(s.odds["collection"], "1 in 3");
  }

  #[test]
  fn malformed_odds_do_not_reject_the_patch() {
    let p = patch(json!({ "budgetPercent": 10, "odds": { "instant": 0.08, "flash": {} } }));
    assert_eq!(p.budget_percent, Some(10.0));

    let mut s = RewardSettings::default();
    s.apply(&p, Utc::now());
    assert_eq!(s.budget_percent, 10.0);
    assert_eq!(s.odds["instant"], "0.08");
    assert!(!s.odds.contains_key("flash"));

    let p = patch(json!({ "revenueBaseline": 900, "odds": "oops" }));
    assert_eq!(p.revenue_baseline, Some(900.0));
    assert!(p.odds.is_none());
  }

  #[test]
  fn view_computes_pool_from_current_values() {
    let mut s = RewardSettings::default();
    s.apply(&patch(json!({ "budgetPercent": 8, "revenueBaseline": "25000" })), Utc::now());
    let view = SettingsView::from(s.clone());
    assert_eq!(view.budget_pool, 2000.0);

    s.apply(&patch(json!({ "budgetPercent": 10 })), Utc::now());
    assert_eq!(SettingsView::from(s).budget_pool, 2500.0);
  }
}
