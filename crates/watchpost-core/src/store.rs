//! The `RecordStore` trait.
//!
//! Implemented by storage backends (e.g. `watchpost-store-sqlite`). The auth
//! gateway depends on this abstraction rather than on a concrete backend.

use crate::record::{Incident, NewIncident, User};

/// Record-level access to incidents and users.
///
/// Every call is independently committed. Operations that target a single row
/// by id report the number of rows they touched instead of failing when the id
/// is absent; callers branch on the count.
pub trait RecordStore {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Incidents ─────────────────────────────────────────────────────────

  /// Persist a new incident and return its store-assigned id.
  fn insert_incident(&self, incident: &NewIncident) -> Result<i64, Self::Error>;

  /// All incidents, newest id first.
  fn list_incidents(&self) -> Result<Vec<Incident>, Self::Error>;

  /// Set the status of incident `id`. Returns the number of rows changed
  /// (`0` when no such incident exists).
  fn update_incident_status(&self, id: i64, status: &str) -> Result<usize, Self::Error>;

  /// Delete incident `id`. Returns the number of rows removed (`0` or `1`).
  fn delete_incident(&self, id: i64) -> Result<usize, Self::Error>;

  // ── Users ─────────────────────────────────────────────────────────────

  fn find_user_by_username(&self, username: &str) -> Result<Option<User>, Self::Error>;

  /// Insert a user row. Fails with a constraint violation if `username` is
  /// already taken.
  fn insert_user(
    &self,
    username: &str,
    password_digest: &str,
    role: &str,
  ) -> Result<i64, Self::Error>;
}
