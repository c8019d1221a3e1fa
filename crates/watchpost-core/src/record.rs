//! Row types for the four tables, plus the inputs used to create them.

use serde::{Deserialize, Serialize};

/// Role assigned to users registered without an explicit one.
pub const DEFAULT_ROLE: &str = "user";

/// Placeholder written into required text columns that a CSV file leaves
/// empty or omits entirely.
pub const UNKNOWN: &str = "Unknown";

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:              i64,
  pub username:        String,
  /// PHC-format digest; never the plaintext password.
  #[serde(skip_serializing, default)]
  pub password_digest: String,
  pub role:            String,
}

// ─── Incidents ───────────────────────────────────────────────────────────────

/// A stored cyber-security incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
  pub id:            i64,
  pub incident_type: String,
  pub severity:      Option<String>,
  pub status:        Option<String>,
  pub description:   Option<String>,
  pub date_reported: Option<String>,
  pub reported_by:   Option<String>,
  /// Only set for incidents ingested from files that carry a timestamp.
  pub created_at:    Option<String>,
}

/// Input for [`RecordStore::insert_incident`](crate::store::RecordStore::insert_incident).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIncident {
  /// Stored in the `date_reported` column.
  pub date:          String,
  pub incident_type: String,
  pub severity:      String,
  pub status:        String,
  pub description:   String,
  pub reported_by:   Option<String>,
}

// ─── Ingested tables ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
  pub id:           i64,
  pub dataset_name: String,
  pub description:  Option<String>,
  pub created_at:   Option<String>,
  pub record_count: Option<i64>,
  pub file_size_mb: Option<f64>,
  pub source:       Option<String>,
  pub category:     Option<String>,
  pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
  pub id:         i64,
  /// Weak reference to [`User::id`]; not enforced.
  pub user_id:    Option<i64>,
  pub issue:      String,
  pub status:     Option<String>,
  pub created_at: Option<String>,
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
  pub incident_type: String,
  pub count:         i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
  /// `None` for incidents that never had a status recorded.
  pub status: Option<String>,
  pub count:  i64,
}
