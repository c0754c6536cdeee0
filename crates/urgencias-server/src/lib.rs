//! HTTP host for the urgencias dashboard API.
//!
//! Wires configuration, a [`TableStore`] and the [`Dataset`] cache into an
//! axum [`Router`]. The binary in `main.rs` is a thin shell around this.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::{Router, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use urgencias_core::{
  dataset::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TTL, DEFAULT_WORKSHEET, Dataset},
  store::TableStore,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `URGENCIAS_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  /// SQLite file holding the worksheets; `~` is expanded.
  pub store_path:          PathBuf,
  pub worksheet:           String,
  /// How long a worksheet read is served from cache.
  pub cache_ttl_secs:      u64,
  /// Read-modify-write attempts before an append reports a conflict.
  pub max_append_attempts: u32,
}

impl ServerConfig {
  /// Layer defaults, the TOML file at `path` (if it exists) and the
  /// environment, in increasing order of precedence.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("store_path", "urgencias.db")?
      .set_default("worksheet", DEFAULT_WORKSHEET)?
      .set_default("cache_ttl_secs", DEFAULT_TTL.as_secs() as i64)?
      .set_default("max_append_attempts", i64::from(DEFAULT_MAX_ATTEMPTS))?
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("URGENCIAS").try_parsing(true))
      .build()?
      .try_deserialize()
  }

  pub fn cache_ttl(&self) -> Duration { Duration::from_secs(self.cache_ttl_secs) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Build the [`Dataset`] described by `config` on top of `store`.
pub fn dataset<S: TableStore>(store: Arc<S>, config: &ServerConfig) -> Dataset<S> {
  Dataset::new(store, config.worksheet.clone())
    .with_ttl(config.cache_ttl())
    .with_max_attempts(config.max_append_attempts)
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the JSON API under `/api`, a liveness probe, and
/// request tracing.
pub fn router<S>(dataset: Arc<Dataset<S>>) -> Router
where
  S: TableStore + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", urgencias_api::api_router(dataset))
    .layer(TraceLayer::new_for_http())
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

// ─── Integration tests ────────────────────────────────────────────────────────
