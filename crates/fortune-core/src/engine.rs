//! [`RewardEngine`]: every reward operation on top of any
//! [`DocumentStore`].
//!
//! Each write is a read-modify-write cycle against one document, committed
//! with a conditional replace. A cycle that loses to a concurrent writer is
//! retried from a fresh read, so concurrent writers to the same key do not
//! lose updates. There are no transactions spanning documents.

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
  Error, Result,
  automation::{AutomationPatch, RewardAutomation},
  catalog::Catalog,
  ledger::{EventsPatch, NewWinner, RewardEvents, Winner, WinnerLedger},
  profile::{
    DEFAULT_KEEP_LATEST, ProfileView, RevealPayload, RewardProfile,
    StreakUpdate,
  },
  settings::{RewardSettings, SettingsPatch, SettingsView},
  store::{DocumentStore, collections::*},
  summary::{RewardSummary, summarize},
};

/// Upper bound on read-modify-write attempts for one operation.
///
/// Every failed attempt means another writer committed, so a writer racing
/// fewer than this many peers always gets through.
pub const MAX_WRITE_ATTEMPTS: usize = 16;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct RewardsConfig {
  pub catalog:             Catalog,
  /// Inventory retention for reveals that do not carry `keepLatest`.
  pub default_keep_latest: usize,
}

impl Default for RewardsConfig {
  fn default() -> Self {
    Self {
      catalog:             Catalog::builtin(),
      default_keep_latest: DEFAULT_KEEP_LATEST,
    }
  }
}

pub struct RewardEngine<S> {
  store:  S,
  config: RewardsConfig,
}

impl<S: DocumentStore> RewardEngine<S> {
  pub fn new(store: S, config: RewardsConfig) -> Self { Self { store, config } }

  pub fn store(&self) -> &S { &self.store }

  pub fn catalog(&self) -> &Catalog { &self.config.catalog }

  // ── Profiles ──────────────────────────────────────────────────────────────

  /// Return the stored profile for `user_id`, creating it from the default
  /// template on first access.
  pub async fn ensure_profile(&self, user_id: &str) -> Result<RewardProfile> {
    let key = user_key(user_id)?;

    for attempt in 1..=MAX_WRITE_ATTEMPTS {
      if let Some((profile, _)) = self.load::<RewardProfile>(PROFILES, key).await? {
        return Ok(profile);
      }
      let profile = RewardProfile::new(key, Utc::now());
      let body = serde_json::to_value(&profile)?;
      if self
        .store
        .insert_one(PROFILES, key, body)
        .await
        .map_err(Error::store)?
      {
        tracing::debug!(user_id = key, "created reward profile");
        return Ok(profile);
      }
      // Another caller created it first; read theirs.
      tracing::debug!(user_id = key, attempt, "profile insert raced");
    }

    Err(contention(PROFILES, key))
  }

  /// The profile with its derived sets, stats and telemetry.
  pub async fn get_reward_profile(&self, user_id: &str) -> Result<ProfileView> {
    let profile = self.ensure_profile(user_id).await?;
    Ok(ProfileView::build(profile, self.catalog()))
  }

  /// Record one reveal: prepend the entry, trim the inventory and apply the
  /// point, tier, instant-win and streak effects carried by `payload`.
  pub async fn record_fortune_result(
    &self,
    user_id: &str,
    payload: RevealPayload,
  ) -> Result<ProfileView> {
    let key = user_key(user_id)?;
    let entry = payload.build_entry(Utc::now());
    let keep = payload.keep_latest(self.config.default_keep_latest);

    let profile = self
      .update(
        PROFILES,
        key,
        || RewardProfile::new(key, Utc::now()),
        |profile| {
          profile.record_reveal(entry.clone(), &payload, keep, Utc::now())
        },
      )
      .await?;

    tracing::debug!(
      user_id = key,
      entry_id = %entry.id,
      entry_type = entry.entry_type.as_str(),
      inventory = profile.inventory.len(),
      "recorded reveal"
    );
    Ok(ProfileView::build(profile, self.catalog()))
  }

  /// Touch only the streak fields.
  pub async fn update_reward_streak(
    &self,
    user_id: &str,
    update: StreakUpdate,
  ) -> Result<ProfileView> {
    let key = user_key(user_id)?;
    let profile = self
      .update(
        PROFILES,
        key,
        || RewardProfile::new(key, Utc::now()),
        |profile| {
          profile.apply_streak(&update);
          profile.touch(Utc::now());
        },
      )
      .await?;
    Ok(ProfileView::build(profile, self.catalog()))
  }

  // ── Settings & automation ─────────────────────────────────────────────────

  pub async fn get_reward_settings(&self) -> Result<SettingsView> {
    let settings = self
      .load::<RewardSettings>(SETTINGS, SETTINGS_ID)
      .await?
      .map(|(s, _)| s)
      .unwrap_or_default();
    Ok(settings.into())
  }

  pub async fn update_reward_settings(
    &self,
    patch: SettingsPatch,
  ) -> Result<SettingsView> {
    let settings = self
      .update(SETTINGS, SETTINGS_ID, RewardSettings::default, |s| {
        s.apply(&patch, Utc::now())
      })
      .await?;
    tracing::info!(
      budget_percent = settings.budget_percent,
      revenue_baseline = settings.revenue_baseline,
      "reward settings updated"
    );
    Ok(settings.into())
  }

  pub async fn get_reward_automation(&self) -> Result<RewardAutomation> {
    Ok(
      self
        .load::<RewardAutomation>(AUTOMATION, AUTOMATION_ID)
        .await?
        .map(|(a, _)| a.with_defaults())
        .unwrap_or_default(),
    )
  }

  pub async fn update_reward_automation(
    &self,
    patch: AutomationPatch,
  ) -> Result<RewardAutomation> {
    let automation = self
      .update(AUTOMATION, AUTOMATION_ID, RewardAutomation::default, |a| {
        a.apply(&patch, Utc::now())
      })
      .await?;
    Ok(automation.with_defaults())
  }

  // ── Aggregation ───────────────────────────────────────────────────────────

  /// Full scan over every profile. Cost grows linearly with the player count.
  pub async fn get_reward_summary(&self) -> Result<RewardSummary> {
    let docs = self.store.find_all(PROFILES).await.map_err(Error::store)?;
    let profiles: Vec<RewardProfile> = docs
      .into_iter()
      .filter_map(|doc| match serde_json::from_value::<RewardProfile>(doc.body) {
        Ok(profile) => Some(profile),
        Err(e) => {
          tracing::warn!(user_id = %doc.id, error = %e, "skipping unreadable profile");
          None
        }
      })
      .collect();

    let settings = self.get_reward_settings().await?.settings;
    let winners = self.winner_ledger().await?;

    Ok(summarize(self.catalog(), &profiles, &settings, &winners))
  }

  // ── Winners & events ──────────────────────────────────────────────────────

  pub async fn add_winner(&self, new: NewWinner) -> Result<Winner> {
    let winner = new.into_winner(Utc::now());
    self
      .update(WINNERS, WINNERS_ID, WinnerLedger::default, |ledger| {
        ledger.push(winner.clone(), Utc::now())
      })
      .await?;
    tracing::info!(winner_id = %winner.id, prize = %winner.prize, "winner announced");
    Ok(winner)
  }

  /// Most recent first.
  pub async fn list_winners(&self) -> Result<Vec<Winner>> {
    Ok(self.winner_ledger().await?.entries)
  }

  pub async fn list_reward_events(&self) -> Result<RewardEvents> {
    Ok(
      self
        .load::<RewardEvents>(EVENTS, EVENTS_ID)
        .await?
        .map(|(e, _)| e)
        .unwrap_or_default(),
    )
  }

  pub async fn update_reward_events(
    &self,
    patch: EventsPatch,
  ) -> Result<RewardEvents> {
    self
      .update(EVENTS, EVENTS_ID, RewardEvents::default, |events| {
        events.apply(patch.clone(), Utc::now())
      })
      .await
  }

  // ── Plumbing ──────────────────────────────────────────────────────────────

  async fn winner_ledger(&self) -> Result<WinnerLedger> {
    Ok(
      self
        .load::<WinnerLedger>(WINNERS, WINNERS_ID)
        .await?
        .map(|(l, _)| l)
        .unwrap_or_default(),
    )
  }

  /// Decode a document together with its revision.
  async fn load<T>(&self, collection: &str, id: &str) -> Result<Option<(T, u64)>>
  where
    T: DeserializeOwned,
  {
    let Some(doc) = self
      .store
      .find_one(collection, id)
      .await
      .map_err(Error::store)?
    else {
      return Ok(None);
    };
    Ok(Some((serde_json::from_value(doc.body)?, doc.revision)))
  }

  /// Read-modify-write one document. `init` supplies the document when it
  /// does not exist yet; `apply` may run more than once.
  async fn update<T, I, F>(
    &self,
    collection: &'static str,
    id: &str,
    init: I,
    mut apply: F,
  ) -> Result<T>
  where
    T: Serialize + DeserializeOwned + Send,
    I: Fn() -> T + Send,
    F: FnMut(&mut T) + Send,
  {
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
      match self.load::<T>(collection, id).await? {
        Some((mut doc, revision)) => {
          apply(&mut doc);
          let body = serde_json::to_value(&doc)?;
          if self
            .store
            .replace_one(collection, id, body, revision)
            .await
            .map_err(Error::store)?
          {
            return Ok(doc);
          }
        }
        None => {
          let mut doc = init();
          apply(&mut doc);
          let body = serde_json::to_value(&doc)?;
          if self
            .store
            .insert_one(collection, id, body)
            .await
            .map_err(Error::store)?
          {
            return Ok(doc);
          }
        }
      }
      tracing::warn!(collection, id, attempt, "write conflict, retrying");
    }

    Err(contention(collection, id))
  }
}

fn user_key(user_id: &str) -> Result<&str> {
  let key = user_id.trim();
  if key.is_empty() {
    return Err(Error::MissingUserId);
  }
  Ok(key)
}

fn contention(collection: &'static str, id: &str) -> Error {
  Error::Contention { collection, id: id.to_owned() }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use chrono::Utc;

  use super::*;
  use crate::store::Document;

  /// A store that serves a fixed document and loses every conditional write.
  struct LosingStore {
    existing: Option<Document>,
    writes:   AtomicUsize,
  }

  impl LosingStore {
    fn new(existing: Option<Document>) -> Self {
      Self { existing, writes: AtomicUsize::new(0) }
    }

    fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }
  }

  impl DocumentStore for LosingStore {
    type Error = std::io::Error;

    async fn find_one(
      &self,
      _collection: &str,
      _id: &str,
    ) -> Result<Option<Document>, Self::Error> {
      Ok(self.existing.clone())
    }

    async fn insert_one(
      &self,
      _collection: &str,
      _id: &str,
      _body: serde_json::Value,
    ) -> Result<bool, Self::Error> {
      self.writes.fetch_add(1, Ordering::SeqCst);
      Ok(false)
    }

    async fn replace_one(
      &self,
      _collection: &str,
      _id: &str,
      _body: serde_json::Value,
      _expected_revision: u64,
    ) -> Result<bool, Self::Error> {
      self.writes.fetch_add(1, Ordering::SeqCst);
      Ok(false)
    }

    async fn find_all(&self, _collection: &str) -> Result<Vec<Document>, Self::Error> {
      Ok(self.existing.iter().cloned().collect())
    }
  }

  fn stored_profile(user_id: &str) -> Document {
    let now = Utc::now();
    Document {
      id:         user_id.to_owned(),
      revision:   3,
      body:       serde_json::to_value(RewardProfile::new(user_id, now)).unwrap(),
      updated_at: now,
    }
  }

  #[tokio::test]
  async fn reveal_gives_up_after_max_attempts() {
    let engine = RewardEngine::new(
      LosingStore::new(Some(stored_profile("u1"))),
      RewardsConfig::default(),
    );

    let result = engine
      .record_fortune_result("u1", RevealPayload::piece("wok-star", "wok"))
      .await;
    assert!(matches!(
      result,
      Err(Error::Contention { collection: PROFILES, ref id }) if id == "u1"
    ));
    assert_eq!(engine.store().writes(), MAX_WRITE_ATTEMPTS);
  }

  #[tokio::test]
  async fn ensure_profile_gives_up_when_inserts_keep_losing() {
    let engine = RewardEngine::new(LosingStore::new(None), RewardsConfig::default());

    let result = engine.ensure_profile("u2").await;
    assert!(matches!(
      result,
      Err(Error::Contention { collection: PROFILES, ref id }) if id == "u2"
    ));
    assert_eq!(engine.store().writes(), MAX_WRITE_ATTEMPTS);
  }

  #[tokio::test]
  async fn singleton_update_gives_up_after_max_attempts() {
    let engine = RewardEngine::new(LosingStore::new(None), RewardsConfig::default());

    let result = engine.add_winner(NewWinner::default()).await;
    assert!(matches!(result, Err(Error::Contention { collection: WINNERS, .. })));
    assert_eq!(engine.store().writes(), MAX_WRITE_ATTEMPTS);
  }
}
