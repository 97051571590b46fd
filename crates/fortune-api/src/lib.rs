//! JSON REST API for the fortune rewards engine.
//!
//! Exposes an axum [`Router`] backed by a [`RewardEngine`] over any
//! [`DocumentStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/rewards", fortune_api::api_router(engine.clone()))
//! ```

pub mod error;
pub mod ledger;
pub mod profiles;
pub mod settings;
pub mod summary;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use fortune_core::{RewardEngine, store::DocumentStore};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: Arc<RewardEngine<S>>) -> Router<()>
where
  S: DocumentStore + 'static,
{
  Router::new()
    // Catalog & dashboard
    .route("/catalog", get(summary::catalog::<S>))
    .route("/summary", get(summary::summary::<S>))
    // Profiles
    .route("/profiles/{user_id}", get(profiles::get_one::<S>))
    .route("/profiles/{user_id}/reveals", post(profiles::reveal::<S>))
    .route("/profiles/{user_id}/streak", post(profiles::streak::<S>))
    // Singletons
    .route(
      "/settings",
      get(settings::get_settings::<S>).patch(settings::patch_settings::<S>),
    )
    .route(
      "/automation",
      get(settings::get_automation::<S>).patch(settings::patch_automation::<S>),
    )
    // Ledgers
    .route(
      "/winners",
      get(ledger::list_winners::<S>).post(ledger::add_winner::<S>),
    )
    .route(
      "/events",
      get(ledger::list_events::<S>).patch(ledger::patch_events::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(engine)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
  };
  use fortune_core::{RewardEngine, RewardsConfig};
  use fortune_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use crate::api_router;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(RewardEngine::new(store, RewardsConfig::default())))
  }

  async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(body) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string())),
      None => builder.body(Body::empty()),
    }
    .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  #[tokio::test]
  async fn profile_is_created_on_first_get() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/profiles/u1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "u1");
    assert_eq!(body["points"], 0);
    assert_eq!(body["inventory"], json!([]));
    assert!(body["sets"].as_array().unwrap().len() >= 1);
    assert_eq!(body["stats"]["totalReveals"], 0);
  }

  #[tokio::test]
  async fn blank_user_id_is_a_bad_request() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/profiles/%20", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user id is required");
  }

  #[tokio::test]
  async fn reveal_returns_created_profile_view() {
    let app = app().await;
    let (status, body) = send(
      &app,
      Method::POST,
      "/profiles/u1/reveals",
      Some(json!({
        "type": "collection",
        "setId": "dragon-dynasty",
        "pieceId": "dragon-head",
        "pointsAwarded": "20"
      })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["points"], 20);
    assert_eq!(body["inventory"][0]["pieceId"], "dragon-head");
    assert_eq!(body["inventory"][0]["type"], "collection");
    let dragon = body["sets"]
      .as_array()
      .unwrap()
      .iter()
      .find(|s| s["id"] == "dragon-dynasty")
      .unwrap();
    assert_eq!(dragon["collectedCount"], 1);
    assert_eq!(dragon["isActive"], true);
  }

  #[tokio::test]
  async fn streak_endpoint_updates_only_the_streak() {
    let app = app().await;
    send(&app, Method::POST, "/profiles/u1/reveals", Some(json!({ "pointsAwarded": 5 }))).await;

    let (status, body) = send(
      &app,
      Method::POST,
      "/profiles/u1/streak",
      Some(json!({ "increment": 2, "bonus": "Keep going" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["streakDays"], 2);
    assert_eq!(body["streakBonus"], "Keep going");
    assert_eq!(body["points"], 5);
  }

  #[tokio::test]
  async fn settings_patch_clamps_and_reports_budget_pool() {
    let app = app().await;
    let (status, body) = send(
      &app,
      Method::PATCH,
      "/settings",
      Some(json!({ "budgetPercent": 150, "revenueBaseline": "2000" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["budgetPercent"], 100.0);
    assert_eq!(body["budgetPool"], 2000.0);

    let (_, body) = send(&app, Method::GET, "/settings", None).await;
    assert_eq!(body["budgetPercent"], 100.0);
  }

  #[tokio::test]
  async fn settings_patch_survives_malformed_odds() {
    let app = app().await;
    let (status, body) = send(
      &app,
      Method::PATCH,
      "/settings",
      Some(json!({ "budgetPercent": 10, "odds": { "instant": 0.08 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["budgetPercent"], 10.0);
    assert_eq!(body["odds"]["instant"], "0.08");

    let (status, _) = send(
      &app,
      Method::PATCH,
      "/settings",
      Some(json!({ "revenueBaseline": 500, "odds": "oops" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/settings", None).await;
    assert_eq!(body["budgetPercent"], 10.0);
    assert_eq!(body["revenueBaseline"], 500.0);
    assert_eq!(body["odds"]["collection"], "1 in 3");
  }

  #[tokio::test]
  async fn automation_round_trips_known_toggles() {
    let app = app().await;
    let (status, body) = send(
      &app,
      Method::PATCH,
      "/automation",
      Some(json!({ "flashEventScheduling": true, "unknownToggle": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body_again) = send(&app, Method::GET, "/automation", None).await;
    assert_eq!(body, body_again);
    assert_eq!(body["toggles"]["flashEventScheduling"], true);
    assert!(body["toggles"].get("unknownToggle").is_none());
  }

  #[tokio::test]
  async fn winners_are_listed_most_recent_first() {
    let app = app().await;
    for prize in ["Free tea", "Free dumplings"] {
      let (status, _) =
        send(&app, Method::POST, "/winners", Some(json!({ "prize": prize }))).await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/winners", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["prize"], "Free dumplings");
  }

  #[tokio::test]
  async fn events_patch_replaces_supplied_lists() {
    let app = app().await;
    let (status, body) = send(
      &app,
      Method::PATCH,
      "/events",
      Some(json!({ "marketingMoments": [{ "title": "Lunar New Year" }], "flashEvents": "oops" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["marketingMoments"][0]["title"], "Lunar New Year");
    assert_eq!(body["flashEvents"], json!([]));
  }

  #[tokio::test]
  async fn summary_and_catalog_are_served() {
    let app = app().await;
    send(&app, Method::POST, "/profiles/a/reveals", Some(json!({ "type": "instant" }))).await;

    let (status, summary) = send(&app, Method::GET, "/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalPlayers"], 1);
    assert_eq!(summary["instantWins"], 1);

    let (status, catalog) = send(&app, Method::GET, "/catalog", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
      catalog["sets"]
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["id"] == "wok-star")
    );
  }
}
