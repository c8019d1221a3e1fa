//! Declared table schemas.
//!
//! The column lists here are the static mirror of the SQLite DDL in
//! `watchpost-store-sqlite`. Ingestion filters incoming CSV columns against the
//! live table, and the store's tests check that the live table matches these
//! declarations.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{Error, Result};

// ─── Tables ──────────────────────────────────────────────────────────────────

/// The fixed set of tables owned by the store.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumIter,
  EnumString,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Table {
  Users,
  Incidents,
  #[strum(to_string = "dataset_metadata", serialize = "dataset-metadata")]
  DatasetMetadata,
  Tickets,
}

impl Table {
  /// Parse a table name, accepting `snake_case` or `kebab-case`.
  pub fn parse(name: &str) -> Result<Self> {
    Self::from_str(name.trim()).map_err(|_| Error::UnknownTable(name.to_owned()))
  }

  /// The SQL identifier of this table.
  pub fn name(self) -> &'static str {
    match self {
      Self::Users => "users",
      Self::Incidents => "incidents",
      Self::DatasetMetadata => "dataset_metadata",
      Self::Tickets => "tickets",
    }
  }

  /// Declared columns, in DDL order.
  pub fn columns(self) -> &'static [Column] {
    match self {
      Self::Users => USERS,
      Self::Incidents => INCIDENTS,
      Self::DatasetMetadata => DATASET_METADATA,
      Self::Tickets => TICKETS,
    }
  }

  /// Names of `NOT NULL` columns without a default.
  pub fn required_columns(self) -> impl Iterator<Item = &'static str> {
    self.columns().iter().filter(|c| c.required).map(|c| c.name)
  }

  /// Whether rows may be bulk-loaded from CSV. User rows carry password
  /// digests and are only ever created through registration.
  pub fn is_ingestible(self) -> bool { !matches!(self, Self::Users) }

  pub fn all() -> impl Iterator<Item = Table> { Self::iter() }
}

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Storage class a column's values are converted to before insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
  Integer,
  Real,
  Text,
}

impl ColumnType {
  /// Map a declared SQL type to a storage class using SQLite's affinity
  /// rules. Anything without integer or real affinity is treated as text.
  pub fn from_declared(declared: &str) -> Self {
    let upper = declared.to_ascii_uppercase();
    if upper.contains("INT") {
      Self::Integer
    } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
      Self::Text
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
      Self::Real
    } else {
      Self::Text
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
  pub name:     &'static str,
  pub ty:       ColumnType,
  /// `NOT NULL` without a default.
  pub required: bool,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
  Column { name, ty, required: false }
}

const fn req(name: &'static str, ty: ColumnType) -> Column {
  Column { name, ty, required: true }
}

use ColumnType::{Integer, Real, Text};

const USERS: &[Column] = &[
  col("id", Integer),
  req("username", Text),
  req("password_digest", Text),
  col("role", Text),
];

const INCIDENTS: &[Column] = &[
  col("id", Integer),
  req("incident_type", Text),
  col("severity", Text),
  col("status", Text),
  col("description", Text),
  col("date_reported", Text),
  col("reported_by", Text),
  col("created_at", Text),
];

const DATASET_METADATA: &[Column] = &[
  col("id", Integer),
  req("dataset_name", Text),
  col("description", Text),
  col("created_at", Text),
  col("record_count", Integer),
  col("file_size_mb", Real),
  col("source", Text),
  col("category", Text),
  col("last_updated", Text),
];

const TICKETS: &[Column] = &[
  col("id", Integer),
  col("user_id", Integer),
  req("issue", Text),
  col("status", Text),
  col("created_at", Text),
];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_accepts_snake_and_kebab_case() {
    assert_eq!(Table::parse("dataset_metadata").unwrap(), Table::DatasetMetadata);
    assert_eq!(Table::parse("dataset-metadata").unwrap(), Table::DatasetMetadata);
    assert_eq!(Table::parse(" Tickets ").unwrap(), Table::Tickets);
    assert!(matches!(Table::parse("cyber"), Err(Error::UnknownTable(_))));
  }

  #[test]
  fn display_matches_sql_name() {
    for table in Table::all() {
      assert_eq!(table.to_string(), table.name());
    }
  }

  #[test]
  fn every_table_has_an_integer_id_first() {
    for table in Table::all() {
      let first = table.columns()[0];
      assert_eq!(first.name, "id");
      assert_eq!(first.ty, ColumnType::Integer);
    }
  }

  #[test]
  fn affinity_rules() {
    assert_eq!(ColumnType::from_declared("INTEGER"), ColumnType::Integer);
    assert_eq!(ColumnType::from_declared("bigint"), ColumnType::Integer);
    assert_eq!(ColumnType::from_declared("REAL"), ColumnType::Real);
    assert_eq!(ColumnType::from_declared("double precision"), ColumnType::Real);
    assert_eq!(ColumnType::from_declared("VARCHAR(20)"), ColumnType::Text);
    assert_eq!(ColumnType::from_declared(""), ColumnType::Text);
  }

  #[test]
  fn required_columns() {
    assert_eq!(Table::Tickets.required_columns().collect::<Vec<_>>(), ["issue"]);
    assert_eq!(
      Table::Users.required_columns().collect::<Vec<_>>(),
      ["username", "password_digest"]
    );
    assert_eq!(
      Table::DatasetMetadata.required_columns().collect::<Vec<_>>(),
      ["dataset_name"]
    );
  }

  #[test]
  fn users_are_not_ingestible() {
    assert!(!Table::Users.is_ingestible());
    assert!(Table::Tickets.is_ingestible());
  }
}
