//! CSV ingestion.
//!
//! A file is read into a [`Frame`], reconciled against its target table's
//! rename and defaulting rules, intersected with the live table's columns and
//! appended in a single transaction. A missing file or a file with no column
//! in common with the table is reported and skipped, never raised.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info, warn};
use watchpost_core::{
  reconcile::{Frame, Value, reconcile},
  schema::Table,
};

use crate::{
  Result, SqliteStore,
  encode::encode_value,
  schema::live_columns,
};

// ─── Report ──────────────────────────────────────────────────────────────────

/// Why a file contributed no rows without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestSkip {
  FileNotFound,
  /// None of the file's columns (after renaming) exist in the table.
  NoMatchingColumns,
}

/// Outcome of loading one CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
  pub path:            PathBuf,
  pub table:           Table,
  pub rows_loaded:     usize,
  /// Columns discarded because the table has no such column, or because they
  /// duplicated an earlier header.
  pub dropped_columns: Vec<String>,
  pub skipped:         Option<IngestSkip>,
}

impl IngestReport {
  fn skipped(path: &Path, table: Table, reason: IngestSkip, dropped: Vec<String>) -> Self {
    Self {
      path: path.to_path_buf(),
      table,
      rows_loaded: 0,
      dropped_columns: dropped,
      skipped: Some(reason),
    }
  }
}

// ─── Loading ─────────────────────────────────────────────────────────────────

impl SqliteStore {
  /// Load the CSV file at `path` into `table` and report how many rows were
  /// appended.
  ///
  /// Rows are all-or-nothing per file: a cell that does not convert to its
  /// column's type, a malformed record or a constraint violation fails the
  /// call and leaves the table as it was.
  pub fn load_csv(&self, path: impl AsRef<Path>, table: Table) -> Result<IngestReport> {
    let path = path.as_ref();
    if !table.is_ingestible() {
      return Err(watchpost_core::Error::NotIngestible(table).into());
    }

    if !path.exists() {
      warn!(path = %path.display(), %table, "csv file not found; skipping");
      return Ok(IngestReport::skipped(path, table, IngestSkip::FileNotFound, Vec::new()));
    }

    let mut frame = read_frame(path)?;
    let mut dropped = reconcile(&mut frame, table)?;

    let live = live_columns(&self.conn, table.name())?;
    dropped.extend(frame.retain_columns(|c| live.iter().any(|l| l.name == c)));
    if !dropped.is_empty() {
      debug!(%table, columns = ?dropped, "dropping columns not present in table");
    }

    if frame.columns().is_empty() {
      warn!(
        path = %path.display(),
        %table,
        "no matching columns between file and table; skipping"
      );
      return Ok(IngestReport::skipped(
        path,
        table,
        IngestSkip::NoMatchingColumns,
        dropped,
      ));
    }

    let missing: Vec<&str> = table
      .required_columns()
      .filter(|c| !frame.has_column(c))
      .collect();
    if !missing.is_empty() && !frame.is_empty() {
      warn!(%table, columns = ?missing, "required columns absent from file; insert will fail");
    }

    for column in &live {
      frame.coerce_column(&column.name, column.ty)?;
    }

    let rows_loaded = self.append(table, &frame)?;
    info!(path = %path.display(), %table, rows = rows_loaded, "loaded csv");

    Ok(IngestReport {
      path: path.to_path_buf(),
      table,
      rows_loaded,
      dropped_columns: dropped,
      skipped: None,
    })
  }

  /// Load several files in order. A failure in one file is logged and
  /// recorded in its slot; the remaining files are still loaded.
  pub fn load_many<P: AsRef<Path>>(&self, files: &[(P, Table)]) -> Vec<Result<IngestReport>> {
    files
      .iter()
      .map(|(path, table)| {
        let result = self.load_csv(path, *table);
        if let Err(e) = &result {
          warn!(path = %path.as_ref().display(), %table, error = %e, "csv load failed");
        }
        result
      })
      .collect()
  }

  /// Append every row of `frame` to `table` in one transaction.
  fn append(&self, table: Table, frame: &Frame) -> Result<usize> {
    let columns = frame
      .columns()
      .iter()
      .map(|c| format!("\"{c}\""))
      .collect::<Vec<_>>()
      .join(", ");
    let placeholders = (1..=frame.columns().len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!("INSERT INTO {} ({columns}) VALUES ({placeholders})", table.name());

    // Rolled back on drop if any row fails.
    let tx = self.conn.unchecked_transaction()?;
    {
      let mut stmt = tx.prepare(&sql)?;
      for row in frame.rows() {
        stmt.execute(rusqlite::params_from_iter(
          row.iter().cloned().map(encode_value),
        ))?;
      }
    }
    tx.commit()?;
    Ok(frame.len())
  }
}

/// Read a CSV file with a header row into a [`Frame`] of text cells. Short
/// records are padded with nulls; a record longer than the header fails.
fn read_frame(path: &Path) -> Result<Frame> {
  let mut rdr = ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .trim(Trim::All)
    .from_path(path)?;

  let headers = rdr.headers()?.clone();
  let mut frame = Frame::new(headers.iter());

  for record in rdr.records() {
    let record = record?;
    frame.push_row(record.iter().map(Value::from_cell).collect())?;
  }

  Ok(frame)
}
