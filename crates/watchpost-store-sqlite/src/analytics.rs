//! Fixed aggregate queries over the incidents table.

use watchpost_core::record::{StatusCount, TypeCount};

use crate::{Result, SqliteStore};

/// Severities counted by [`SqliteStore::high_severity_by_status`].
pub const HIGH_SEVERITIES: [&str; 2] = ["High", "Critical"];

impl SqliteStore {
  /// Number of incidents per incident type, most frequent first.
  pub fn incident_counts_by_type(&self) -> Result<Vec<TypeCount>> {
    let mut stmt = self.conn.prepare(
      "SELECT incident_type, COUNT(*) AS count
       FROM incidents
       GROUP BY incident_type
       ORDER BY count DESC, incident_type ASC",
    )?;
    let rows = stmt
      .query_map([], |row| {
        Ok(TypeCount { incident_type: row.get(0)?, count: row.get(1)? })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  /// Number of high or critical severity incidents per status, most frequent
  /// first.
  pub fn high_severity_by_status(&self) -> Result<Vec<StatusCount>> {
    let mut stmt = self.conn.prepare(
      "SELECT status, COUNT(*) AS count
       FROM incidents
       WHERE severity IN (?1, ?2)
       GROUP BY status
       ORDER BY count DESC, status ASC",
    )?;
    let rows = stmt
      .query_map(rusqlite::params![HIGH_SEVERITIES[0], HIGH_SEVERITIES[1]], |row| {
        Ok(StatusCount { status: row.get(0)?, count: row.get(1)? })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }
}
