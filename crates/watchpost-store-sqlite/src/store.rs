//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _};
use tracing::debug;
use watchpost_core::{
  record::{DatasetMetadata, Incident, NewIncident, Ticket, User},
  schema::Table,
  store::RecordStore,
};

use crate::{
  Result,
  encode::{
    DATASET_COLUMNS, INCIDENT_COLUMNS, TICKET_COLUMNS, USER_COLUMNS, decode_dataset,
    decode_incident, decode_ticket, decode_user,
  },
  schema::{PRAGMAS, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Watchpost store backed by a single SQLite file.
///
/// The store owns its connection; dropping the store closes it. Open one per
/// unit of work rather than sharing it globally.
pub struct SqliteStore {
  pub(crate) conn: Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and ensure the schema exists.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening sqlite store");
    let conn = Connection::open(path)?;
    Self::from_connection(conn)
  }

  /// Open an in-memory store.
  pub fn open_in_memory() -> Result<Self> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    conn.execute_batch(PRAGMAS)?;
    let store = Self { conn };
    store.ensure_schema()?;
    Ok(store)
  }

  /// Create any missing tables. Existing tables and their rows are left
  /// untouched, so calling this repeatedly is harmless.
  pub fn ensure_schema(&self) -> Result<()> {
    self.conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  /// Explicitly close the connection, surfacing any error SQLite reports
  /// while doing so. Dropping the store also closes it, silently.
  pub fn close(self) -> Result<()> {
    self.conn.close().map_err(|(_, e)| e)?;
    Ok(())
  }

  // ── Ingested tables ───────────────────────────────────────────────────────

  /// All tickets, newest id first.
  pub fn list_tickets(&self) -> Result<Vec<Ticket>> {
    let mut stmt = self
      .conn
      .prepare(&format!("SELECT {TICKET_COLUMNS} FROM tickets ORDER BY id DESC"))?;
    let rows = stmt
      .query_map([], decode_ticket)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  /// All dataset metadata rows, newest id first.
  pub fn list_datasets(&self) -> Result<Vec<DatasetMetadata>> {
    let mut stmt = self.conn.prepare(&format!(
      "SELECT {DATASET_COLUMNS} FROM dataset_metadata ORDER BY id DESC"
    ))?;
    let rows = stmt
      .query_map([], decode_dataset)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  /// Number of rows currently in `table`.
  pub fn count(&self, table: Table) -> Result<usize> {
    let n: i64 = self.conn.query_row(
      &format!("SELECT COUNT(*) FROM {}", table.name()),
      [],
      |row| row.get(0),
    )?;
    Ok(n as usize)
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  // ── Incidents ─────────────────────────────────────────────────────────────

  fn insert_incident(&self, incident: &NewIncident) -> Result<i64> {
    self.conn.execute(
      "INSERT INTO incidents
         (date_reported, incident_type, severity, status, description, reported_by)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        incident.date,
        incident.incident_type,
        incident.severity,
        incident.status,
        incident.description,
        incident.reported_by,
      ],
    )?;
    Ok(self.conn.last_insert_rowid())
  }

  fn list_incidents(&self) -> Result<Vec<Incident>> {
    let mut stmt = self.conn.prepare(&format!(
      "SELECT {INCIDENT_COLUMNS} FROM incidents ORDER BY id DESC"
    ))?;
    let rows = stmt
      .query_map([], decode_incident)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  fn update_incident_status(&self, id: i64, status: &str) -> Result<usize> {
    let changed = self.conn.execute(
      "UPDATE incidents SET status = ?1 WHERE id = ?2",
      rusqlite::params![status, id],
    )?;
    Ok(changed)
  }

  fn delete_incident(&self, id: i64) -> Result<usize> {
    let removed = self
      .conn
      .execute("DELETE FROM incidents WHERE id = ?1", rusqlite::params![id])?;
    Ok(removed)
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let user = self
      .conn
      .query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
        rusqlite::params![username],
        decode_user,
      )
      .optional()?;
    Ok(user)
  }

  fn insert_user(&self, username: &str, password_digest: &str, role: &str) -> Result<i64> {
    self.conn.execute(
      "INSERT INTO users (username, password_digest, role) VALUES (?1, ?2, ?3)",
      rusqlite::params![username, password_digest, role],
    )?;
    Ok(self.conn.last_insert_rowid())
  }
}
