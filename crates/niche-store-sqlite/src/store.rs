//! [`SqliteStore`]: the SQLite implementation of [`SessionStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use niche_core::{
  session::Session,
  store::{SessionStore, SessionSummary},
};

use crate::{
  encode::{RawSummary, encode_dt, encode_uuid},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A session store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SessionStore impl ───────────────────────────────────────────────────────

impl SessionStore for SqliteStore {
  type Error = Error;

  async fn save(&self, session: &Session) -> Result<()> {
    let id_str       = encode_uuid(session.id);
    let created_str  = encode_dt(session.created_at);
    let updated_str  = encode_dt(Utc::now());
    let summary_json = serde_json::to_string(&SessionSummary::from(session))?;
    let body_json    = session.to_json()?;
    let body_len     = body_json.len();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions
             (session_id, created_at, updated_at, summary_json, body_json)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(session_id) DO UPDATE SET
             updated_at   = excluded.updated_at,
             summary_json = excluded.summary_json,
             body_json    = excluded.body_json",
          rusqlite::params![id_str, created_str, updated_str, summary_json, body_json],
        )?;
        Ok(())
      })
      .await?;

    debug!(session = %session.id, bytes = body_len, "saved session");
    Ok(())
  }

  async fn load(&self, id: Uuid) -> Result<Option<Session>> {
    let id_str = encode_uuid(id);

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT body_json FROM sessions WHERE session_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    body
      .map(|json| Session::from_json(&json).map_err(Error::from))
      .transpose()
  }

  async fn list(&self) -> Result<Vec<SessionSummary>> {
    let raws: Vec<RawSummary> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT session_id, created_at, summary_json FROM sessions")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSummary {
              session_id:   row.get(0)?,
              created_at:   row.get(1)?,
              summary_json: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut summaries = raws
      .into_iter()
      .map(RawSummary::into_summary)
      .collect::<Result<Vec<_>>>()?;
    summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(summaries)
  }
}
