//! SQL schema for the session store.
//!
//! Executed once at connection startup. Later migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per analysis session. The body is the complete serialized
-- aggregate; the summary is denormalized for cheap listing.
CREATE TABLE IF NOT EXISTS sessions (
    session_id    TEXT PRIMARY KEY,
    created_at    TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at    TEXT NOT NULL,   -- ISO 8601 UTC; bumped on every save
    summary_json  TEXT NOT NULL,
    body_json     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS sessions_created_idx ON sessions(created_at);

PRAGMA user_version = 1;
";
