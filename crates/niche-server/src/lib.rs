//! HTTP server for niche analyses.
//!
//! Mounts the [`niche_api`] router under `/api/v1`, caps request bodies at
//! the configured upload size and traces every request.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, extract::DefaultBodyLimit};
use niche_core::store::SessionStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Prefix under which the API is mounted.
pub const API_PREFIX: &str = "/api/v1";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `NICHE_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// Largest accepted request body, in bytes. Uploads carry three CSVs.
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes: usize,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("niche.sqlite3") }

fn default_max_upload_bytes() -> usize { 32 * 1024 * 1024 }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             default_host(),
      port:             default_port(),
      store_path:       default_store_path(),
      max_upload_bytes: default_max_upload_bytes(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server [`Router`] for `store`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: SessionStore + 'static,
{
  Router::new()
    .nest(API_PREFIX, niche_api::api_router(store))
    .layer(DefaultBodyLimit::max(config.max_upload_bytes))
    .layer(TraceLayer::new_for_http())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
