//! Handlers for `/profiles` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/profiles/:user_id` | Created on first access |
//! | `POST` | `/profiles/:user_id/reveals` | Body: reveal payload, 201 |
//! | `POST` | `/profiles/:user_id/streak` | Body: `{"increment":1}` etc. |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use fortune_core::{
  RewardEngine,
  profile::{ProfileView, RevealPayload, StreakUpdate},
  store::DocumentStore,
};

use crate::error::ApiError;

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /profiles/:user_id`
pub async fn get_one<S>(
  State(engine): State<Arc<RewardEngine<S>>>,
  Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(engine.get_reward_profile(&user_id).await?))
}

// ─── Reveal ───────────────────────────────────────────────────────────────────

/// `POST /profiles/:user_id/reveals`
pub async fn reveal<S>(
  State(engine): State<Arc<RewardEngine<S>>>,
  Path(user_id): Path<String>,
  Json(payload): Json<RevealPayload>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let view = engine.record_fortune_result(&user_id, payload).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

// ─── Streak ───────────────────────────────────────────────────────────────────

/// `POST /profiles/:user_id/streak`
pub async fn streak<S>(
  State(engine): State<Arc<RewardEngine<S>>>,
  Path(user_id): Path<String>,
  Json(update): Json<StreakUpdate>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(engine.update_reward_streak(&user_id, update).await?))
}
