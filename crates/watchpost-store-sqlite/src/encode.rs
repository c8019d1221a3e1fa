//! Conversions between domain types and SQLite rows.

use rusqlite::{Row, types::Value as SqlValue};
use watchpost_core::{
  reconcile::Value,
  record::{DatasetMetadata, Incident, Ticket, User},
};

// ─── Cells ───────────────────────────────────────────────────────────────────

pub fn encode_value(value: Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(i),
    Value::Real(f) => SqlValue::Real(f),
    Value::Text(s) => SqlValue::Text(s),
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "id, username, password_digest, role";

pub fn decode_user(row: &Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    id:              row.get(0)?,
    username:        row.get(1)?,
    password_digest: row.get(2)?,
    // Rows written with an explicit NULL role fall back to the default.
    role:            row
      .get::<_, Option<String>>(3)?
      .unwrap_or_else(|| watchpost_core::record::DEFAULT_ROLE.to_owned()),
  })
}

pub const INCIDENT_COLUMNS: &str = "id, incident_type, severity, status, description, \
                                    date_reported, reported_by, created_at";

pub fn decode_incident(row: &Row<'_>) -> rusqlite::Result<Incident> {
  Ok(Incident {
    id:            row.get(0)?,
    incident_type: row.get(1)?,
    severity:      row.get(2)?,
    status:        row.get(3)?,
    description:   row.get(4)?,
    date_reported: row.get(5)?,
    reported_by:   row.get(6)?,
    created_at:    row.get(7)?,
  })
}

pub const DATASET_COLUMNS: &str = "id, dataset_name, description, created_at, record_count, \
                                   file_size_mb, source, category, last_updated";

pub fn decode_dataset(row: &Row<'_>) -> rusqlite::Result<DatasetMetadata> {
  Ok(DatasetMetadata {
    id:           row.get(0)?,
    dataset_name: row.get(1)?,
    description:  row.get(2)?,
    created_at:   row.get(3)?,
    record_count: row.get(4)?,
    file_size_mb: row.get(5)?,
    source:       row.get(6)?,
    category:     row.get(7)?,
    last_updated: row.get(8)?,
  })
}

pub const TICKET_COLUMNS: &str = "id, user_id, issue, status, created_at";

pub fn decode_ticket(row: &Row<'_>) -> rusqlite::Result<Ticket> {
  Ok(Ticket {
    id:         row.get(0)?,
    user_id:    row.get(1)?,
    issue:      row.get(2)?,
    status:     row.get(3)?,
    created_at: row.get(4)?,
  })
}
