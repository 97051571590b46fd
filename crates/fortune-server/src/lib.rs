//! Server wiring for the fortune rewards API: configuration loading and the
//! top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use fortune_core::{
  RewardEngine, RewardsConfig, catalog::Catalog, profile::DEFAULT_KEEP_LATEST,
  store::DocumentStore,
};
use serde::Deserialize;

/// Prefix the API is mounted under.
pub const API_PREFIX: &str = "/api/rewards";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FORTUNE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  /// JSON catalog replacing the built-in sets.
  #[serde(default)]
  pub catalog_path:        Option<PathBuf>,
  #[serde(default = "default_keep_latest")]
  pub default_keep_latest: usize,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8787 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/fortune/rewards.db") }

fn default_keep_latest() -> usize { DEFAULT_KEEP_LATEST }

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `FORTUNE_*` environment
  /// variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("FORTUNE"))
      .build()
      .context("failed to read config file")?;
    Self::from_settings(settings)
  }

  pub fn from_settings(settings: config::Config) -> anyhow::Result<Self> {
    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Engine configuration, reading the catalog file if one is configured.
  pub fn rewards_config(&self) -> anyhow::Result<RewardsConfig> {
    let catalog = match &self.catalog_path {
      Some(path) => {
        let path = expand_tilde(path);
        let raw = std::fs::read_to_string(&path)
          .with_context(|| format!("failed to read catalog at {path:?}"))?;
        Catalog::from_json(&raw)
          .with_context(|| format!("failed to parse catalog at {path:?}"))?
      }
      None => Catalog::builtin(),
    };
    Ok(RewardsConfig {
      catalog,
      default_keep_latest: self.default_keep_latest.max(1),
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the rewards API nested under [`API_PREFIX`].
pub fn app<S>(engine: Arc<RewardEngine<S>>) -> Router
where
  S: DocumentStore + 'static,
{
  Router::new().nest(API_PREFIX, fortune_api::api_router(engine))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
