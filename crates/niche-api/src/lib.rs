//! JSON REST API for niche analyses.
//!
//! Exposes an axum [`Router`] backed by any
//! [`niche_core::store::SessionStore`]. Body limits, TLS and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", niche_api::api_router(store.clone()))
//! ```

pub mod analysis;
pub mod error;
pub mod locks;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use niche_core::store::SessionStore;

pub use error::ApiError;
pub use locks::SessionLocks;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
  pub locks: SessionLocks,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      locks: self.locks.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SessionStore + 'static,
{
  let state = AppState {
    store,
    locks: SessionLocks::default(),
  };

  Router::new()
    .route(
      "/analysis",
      get(analysis::list::<S>).post(analysis::upload::<S>),
    )
    .route("/analysis/rows", post(analysis::create_from_rows::<S>))
    .route("/analysis/{id}", get(analysis::get_one::<S>))
    .route("/analysis/{id}/{target}", put(analysis::edit::<S>))
    .with_state(state)
}
