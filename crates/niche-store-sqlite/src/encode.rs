//! Conversions between domain values and their SQLite column text.
//!
//! Timestamps are RFC 3339 strings and UUIDs are hyphenated lowercase.

use chrono::{DateTime, Utc};
use niche_core::store::SessionSummary;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A `sessions` row as read for listing, before decoding.
pub struct RawSummary {
  pub session_id:   String,
  pub created_at:   String,
  pub summary_json: String,
}

impl RawSummary {
  /// Decode the summary. The key columns override whatever the JSON says.
  pub fn into_summary(self) -> Result<SessionSummary> {
    let mut summary: SessionSummary = serde_json::from_str(&self.summary_json)?;
    summary.id = decode_uuid(&self.session_id)?;
    summary.created_at = decode_dt(&self.created_at)?;
    Ok(summary)
  }
}
