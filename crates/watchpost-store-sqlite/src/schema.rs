//! SQL schema for the Watchpost SQLite store.
//!
//! Executed by [`SqliteStore::ensure_schema`](crate::SqliteStore::ensure_schema).
//! There is no migration logic: a column added here later must be added to
//! existing databases by hand.

use rusqlite::Connection;
use watchpost_core::schema::ColumnType;

use crate::{Error, Result};

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `AUTOINCREMENT` keeps ids from being reused after a delete.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL UNIQUE,
    password_digest TEXT NOT NULL,
    role            TEXT DEFAULT 'user'
);

CREATE TABLE IF NOT EXISTS incidents (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    incident_type TEXT NOT NULL,
    severity      TEXT,
    status        TEXT,
    description   TEXT,
    date_reported TEXT,
    reported_by   TEXT,
    created_at    TEXT
);

CREATE TABLE IF NOT EXISTS dataset_metadata (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    dataset_name TEXT NOT NULL,
    description  TEXT,
    created_at   TEXT,
    record_count INTEGER,
    file_size_mb REAL,
    source       TEXT,
    category     TEXT,
    last_updated TEXT
);

-- user_id is a weak reference: declared, never enforced.
CREATE TABLE IF NOT EXISTS tickets (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER REFERENCES users(id),
    issue      TEXT NOT NULL,
    status     TEXT DEFAULT 'open',
    created_at TEXT
);

CREATE INDEX IF NOT EXISTS incidents_type_idx     ON incidents(incident_type);
CREATE INDEX IF NOT EXISTS incidents_severity_idx ON incidents(severity);
";

/// Pragmas applied to every connection on open.
///
/// Foreign keys stay off: `tickets.user_id` may name users that were never
/// registered here.
pub const PRAGMAS: &str = "PRAGMA foreign_keys = OFF;";

/// A column as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveColumn {
  pub name: String,
  pub ty:   ColumnType,
}

/// Introspect the columns of `table` in the live database.
///
/// Fails with [`Error::MissingTable`] when the table does not exist, since
/// `PRAGMA table_info` silently returns nothing in that case.
pub fn live_columns(conn: &Connection, table: &str) -> Result<Vec<LiveColumn>> {
  let mut stmt = conn.prepare("SELECT name, type FROM pragma_table_info(?1)")?;
  let columns = stmt
    .query_map(rusqlite::params![table], |row| {
      let name: String = row.get(0)?;
      let declared: String = row.get(1)?;
      Ok(LiveColumn { name, ty: ColumnType::from_declared(&declared) })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  if columns.is_empty() {
    return Err(Error::MissingTable(table.to_owned()));
  }
  Ok(columns)
}
