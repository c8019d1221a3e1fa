//! Error types for `watchpost-core`.

use thiserror::Error;

use crate::schema::{ColumnType, Table};

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown table: {0:?}")]
  UnknownTable(String),

  #[error("table {0} cannot be loaded from CSV")]
  NotIngestible(Table),

  /// A cell could not be converted to the type its target column declares.
  /// `row` is 1-based and counts data rows only.
  #[error("row {row}: cannot store {value:?} in {column} as {expected}")]
  Coercion {
    column:   String,
    row:      usize,
    value:    String,
    expected: ColumnType,
  },

  /// A record carried more fields than the header declares. `row` is 1-based
  /// and counts data rows only.
  #[error("row {row}: found {fields} fields, header has {width}")]
  RowTooLong {
    row:    usize,
    fields: usize,
    width:  usize,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
