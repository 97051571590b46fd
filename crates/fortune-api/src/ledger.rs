//! Handlers for `/winners` and `/events`.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/winners` | Most recent first, at most 25 |
//! | `POST`  | `/winners` | Body: `{"prize":"..."}`, 201 |
//! | `GET`   | `/events` | |
//! | `PATCH` | `/events` | Replaces only the lists present in the body |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use fortune_core::{
  RewardEngine,
  ledger::{EventsPatch, NewWinner, RewardEvents, Winner},
  store::DocumentStore,
};

use crate::error::ApiError;

// ─── Winners ──────────────────────────────────────────────────────────────────

/// `GET /winners`
pub async fn list_winners<S>(
  State(engine): State<Arc<RewardEngine<S>>>,
) -> Result<Json<Vec<Winner>>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(engine.list_winners().await?))
}

/// `POST /winners`
pub async fn add_winner<S>(
  State(engine): State<Arc<RewardEngine<S>>>,
  Json(body): Json<NewWinner>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let winner = engine.add_winner(body).await?;
  Ok((StatusCode::CREATED, Json(winner)))
}

// ─── Events ───────────────────────────────────────────────────────────────────

/// `GET /events`
pub async fn list_events<S>(
  State(engine): State<Arc<RewardEngine<S>>>,
) -> Result<Json<RewardEvents>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(engine.list_reward_events().await?))
}

/// `PATCH /events`
pub async fn patch_events<S>(
  State(engine): State<Arc<RewardEngine<S>>>,
  Json(patch): Json<EventsPatch>,
) -> Result<Json<RewardEvents>, ApiError>
where
  S: DocumentStore,
{
  Ok(Json(engine.update_reward_events(patch).await?))
}
