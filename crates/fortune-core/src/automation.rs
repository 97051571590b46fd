//! Automation toggles (singleton document).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every toggle the automation layer understands, with its default.
pub const DEFAULT_TOGGLES: &[(&str, bool)] = &[
  ("announceWinners", true),
  ("expiringPieceReminders", true),
  ("streakBoostNotifications", false),
  ("flashEventScheduling", false),
  ("marketingMomentSync", false),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardAutomation {
  pub toggles:    BTreeMap<String, bool>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl Default for RewardAutomation {
  fn default() -> Self {
    Self {
      toggles:    DEFAULT_TOGGLES
        .iter()
        .map(|(k, v)| ((*k).to_owned(), *v))
        .collect(),
      updated_at: None,
    }
  }
}

impl RewardAutomation {
  /// Add defaults for any toggle missing from a stored document.
  pub fn with_defaults(mut self) -> Self {
    for (key, value) in DEFAULT_TOGGLES {
      self.toggles.entry((*key).to_owned()).or_insert(*value);
    }
    self
  }

  /// Apply only known keys carrying literal booleans.
  pub fn apply(&mut self, patch: &AutomationPatch, now: DateTime<Utc>) {
    for (key, value) in &patch.0 {
      let known = DEFAULT_TOGGLES.iter().any(|(k, _)| *k == key.as_str());
      if let (true, Value::Bool(b)) = (known, value) {
        self.toggles.insert(key.clone(), *b);
      }
    }
    self.updated_at = Some(now);
  }

  pub fn is_enabled(&self, key: &str) -> bool {
    self.toggles.get(key).copied().unwrap_or(false)
  }
}

/// Raw toggle patch; values are checked in [`RewardAutomation::apply`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AutomationPatch(pub BTreeMap<String, Value>);

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn patch(v: Value) -> AutomationPatch { serde_json::from_value(v).unwrap() }

  #[test]
  fn defaults_fill_missing_keys() {
    let stored = RewardAutomation {
      toggles:    [("announceWinners".to_owned(), false)].into_iter().collect(),
      updated_at: None,
    };
    let filled = stored.with_defaults();
    assert!(!filled.is_enabled("announceWinners"));
    assert!(filled.is_enabled("expiringPieceReminders"));
    assert_eq!(filled.toggles.len(), DEFAULT_TOGGLES.len());
  }

  #[test]
  fn only_booleans_for_known_keys_apply() {
    let mut a = RewardAutomation::default();
    a.apply(
      &patch(json!({
        "streakBoostNotifications": true,
        "announceWinners": "false",
        "flashEventScheduling": 1,
        "selfDestruct": true
      })),
      Utc::now(),
    );
    assert!(a.is_enabled("streakBoostNotifications"));
    assert!(a.is_enabled("announceWinners"));
    assert!(!a.is_enabled("flashEventScheduling"));
    assert!(!a.toggles.contains_key("selfDestruct"));
  }
}
