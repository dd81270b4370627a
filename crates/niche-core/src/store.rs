//! The `SessionStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `niche-store-sqlite`).
//! The core itself holds no sessions; higher layers (`niche-api`,
//! `niche-server`) depend on this abstraction, not on a concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::Session;

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Listing entry for a stored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
  pub id:               Uuid,
  pub created_at:       DateTime<Utc>,
  pub keyword_count:    usize,
  pub competitor_count: usize,
  pub product_count:    usize,
  pub total_market_sv:  u64,
}

impl From<&Session> for SessionSummary {
  fn from(session: &Session) -> Self {
    Self {
      id:               session.id,
      created_at:       session.created_at,
      keyword_count:    session.entities.keywords.len(),
      competitor_count: session.entities.competitors.len(),
      product_count:    session.entities.products.len(),
      total_market_sv:  session.calculations.total_market_sv,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over session persistence.
///
/// Sessions are saved and loaded whole. Serializing concurrent writers to
/// the same session is the caller's job; a store only guarantees that each
/// `save` replaces the previous document atomically.
pub trait SessionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert or replace `session`.
  fn save<'a>(
    &'a self,
    session: &'a Session,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Retrieve a session by id. Returns `None` if not found.
  fn load(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Summaries of every stored session, newest first.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<SessionSummary>, Self::Error>> + Send + '_;
}
