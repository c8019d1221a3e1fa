//! Error type for `watchpost-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] watchpost_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  /// The live schema does not contain a table the store expects.
  #[error("table {0} does not exist; run schema initialisation first")]
  MissingTable(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
