//! Handlers for the `/settings` and `/automation` singletons.

use std::sync::Arc;

use axum::{Json, extract::State};
use fortune_core::{
  RewardEngine,
  automation::{AutomationPatch, RewardAutomation},
  settings::{SettingsPatch, SettingsView},
  store::DocumentStore,
};

use crate::error::ApiError;

/// `GET /settings`
pub async fn get_settings<S>(
  State(engine): State<Arc<RewardEngine<S>>>,
) -> Result<Json<SettingsView>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(engine.get_reward_settings().await?))
}

/// `PATCH /settings`: `budgetPercent` is clamped to `[0, 100]`, `odds`
/// merges per key.
pub async fn patch_settings<S>(
  State(engine): State<Arc<RewardEngine<S>>>,
  Json(patch): Json<SettingsPatch>,
) -> Result<Json<SettingsView>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(engine.update_reward_settings(patch).await?))
}

/// `GET /automation`
pub async fn get_automation<S>(
  State(engine): State<Arc<RewardEngine<S>>>,
) -> Result<Json<RewardAutomation>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(engine.get_reward_automation().await?))
}

/// `PATCH /automation`: unknown keys and non-boolean values are ignored.
pub async fn patch_automation<S>(
  State(engine): State<Arc<RewardEngine<S>>>,
  Json(patch): Json<AutomationPatch>,
) -> Result<Json<RewardAutomation>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(engine.update_reward_automation(patch).await?))
}
