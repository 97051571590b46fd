//! Read-only dashboard endpoints.

use std::sync::Arc;

use axum::{Json, extract::State};
use fortune_core::{
  RewardEngine,
  catalog::Catalog,
  store::DocumentStore,
  summary::RewardSummary,
};

use crate::error::ApiError;

/// `GET /summary`
pub async fn summary<S>(
  State(engine): State<Arc<RewardEngine<S>>>,
) -> Result<Json<RewardSummary>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(engine.get_reward_summary().await?))
}

/// `GET /catalog`
pub async fn catalog<S>(State(engine): State<Arc<RewardEngine<S>>>) -> Json<Catalog>
where
  S: DocumentStore,
{
  Json(engine.catalog().clone())
}
