//! CSV column reconciliation.
//!
//! Source files evolve independently of the schema. Before rows reach the
//! database their headers are normalized, renamed through a fixed per-table
//! map and given table-specific defaults. The caller then intersects the
//! result with the live table's columns via [`Frame::retain_columns`]; any
//! column the table does not have is dropped rather than treated as an error.

use crate::{
  Error, Result,
  record::UNKNOWN,
  schema::{ColumnType, Table},
};

// ─── Values ──────────────────────────────────────────────────────────────────

/// A single cell on its way into the database.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
}

impl Value {
  /// Build a value from a raw CSV cell. Surrounding whitespace is removed and
  /// an empty cell becomes `Null`.
  pub fn from_cell(cell: &str) -> Self {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
      Self::Null
    } else {
      Self::Text(trimmed.to_owned())
    }
  }

  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  /// Convert to the storage class `ty`. Only text is converted; `Null` and
  /// already-typed values pass through. On failure the offending text is
  /// returned.
  pub fn coerce(self, ty: ColumnType) -> std::result::Result<Self, String> {
    let Self::Text(text) = self else {
      return Ok(self);
    };
    match ty {
      ColumnType::Text => Ok(Self::Text(text)),
      ColumnType::Real => text.parse::<f64>().map(Self::Real).map_err(|_| text),
      ColumnType::Integer => {
        if let Ok(i) = text.parse::<i64>() {
          return Ok(Self::Integer(i));
        }
        // Spreadsheet exports often write whole numbers as `3.0`.
        match text.parse::<f64>() {
          Ok(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Ok(Self::Integer(f as i64))
          }
          _ => Err(text),
        }
      }
    }
  }
}

// ─── Frame ───────────────────────────────────────────────────────────────────

/// A loosely-typed table of rows keyed by column name, as read from a CSV
/// file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
  columns: Vec<String>,
  rows:    Vec<Vec<Value>>,
}

impl Frame {
  pub fn new<I, S>(columns: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      columns: columns.into_iter().map(Into::into).collect(),
      rows:    Vec::new(),
    }
  }

  /// Append a row, padding a short row with `Null`. A row wider than the
  /// frame is rejected.
  pub fn push_row(&mut self, mut row: Vec<Value>) -> Result<()> {
    let width = self.columns.len();
    if row.len() > width {
      return Err(Error::RowTooLong {
        row: self.rows.len() + 1,
        fields: row.len(),
        width,
      });
    }
    row.resize(width, Value::Null);
    self.rows.push(row);
    Ok(())
  }

  pub fn columns(&self) -> &[String] { &self.columns }

  pub fn rows(&self) -> &[Vec<Value>] { &self.rows }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  pub fn position(&self, column: &str) -> Option<usize> {
    self.columns.iter().position(|c| c == column)
  }

  pub fn has_column(&self, column: &str) -> bool { self.position(column).is_some() }

  /// Values of one column, top to bottom.
  pub fn column_values(&self, column: &str) -> Option<Vec<&Value>> {
    let idx = self.position(column)?;
    Some(self.rows.iter().map(|row| &row[idx]).collect())
  }

  /// Normalize every header (see [`normalize_header`]). When two headers
  /// normalize to the same name the first one wins; the later duplicates are
  /// removed and their original names returned.
  pub fn normalize_headers(&mut self) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(self.columns.len());
    let mut duplicates = Vec::new();
    let mut keep = Vec::with_capacity(self.columns.len());

    for original in &self.columns {
      let normalized = normalize_header(original);
      if seen.contains(&normalized) {
        duplicates.push(original.clone());
        keep.push(false);
      } else {
        seen.push(normalized);
        keep.push(true);
      }
    }

    self.columns = seen;
    self.retain_by_mask(&keep);
    duplicates
  }

  /// Rename `from` to `to`. Does nothing when `from` is absent or when a
  /// column named `to` already exists. Returns whether a rename happened.
  pub fn rename(&mut self, from: &str, to: &str) -> bool {
    if self.has_column(to) {
      return false;
    }
    match self.position(from) {
      Some(idx) => {
        self.columns[idx] = to.to_owned();
        true
      }
      None => false,
    }
  }

  /// Append a column holding `fill` in every row.
  pub fn add_column(&mut self, column: &str, fill: Value) {
    self.columns.push(column.to_owned());
    for row in &mut self.rows {
      row.push(fill.clone());
    }
  }

  /// Apply `f` to every cell of `column`. A missing column is a no-op.
  pub fn map_column<F>(&mut self, column: &str, mut f: F)
  where
    F: FnMut(Value) -> Value,
  {
    let Some(idx) = self.position(column) else {
      return;
    };
    for row in &mut self.rows {
      let cell = std::mem::replace(&mut row[idx], Value::Null);
      row[idx] = f(cell);
    }
  }

  /// Convert every cell of `column` to `ty`, failing on the first cell that
  /// does not convert. A missing column is a no-op.
  pub fn coerce_column(&mut self, column: &str, ty: ColumnType) -> Result<()> {
    let Some(idx) = self.position(column) else {
      return Ok(());
    };
    for (i, row) in self.rows.iter_mut().enumerate() {
      let cell = std::mem::replace(&mut row[idx], Value::Null);
      row[idx] = cell.coerce(ty).map_err(|value| Error::Coercion {
        column: column.to_owned(),
        row: i + 1,
        value,
        expected: ty,
      })?;
    }
    Ok(())
  }

  /// Keep only the columns for which `keep` returns `true`, preserving their
  /// order. Returns the names of the dropped columns.
  pub fn retain_columns<F>(&mut self, mut keep: F) -> Vec<String>
  where
    F: FnMut(&str) -> bool,
  {
    let mask: Vec<bool> = self.columns.iter().map(|c| keep(c)).collect();
    let dropped = self
      .columns
      .iter()
      .zip(&mask)
      .filter(|(_, k)| !**k)
      .map(|(c, _)| c.clone())
      .collect();

    self.columns = std::mem::take(&mut self.columns)
      .into_iter()
      .zip(&mask)
      .filter_map(|(c, k)| k.then_some(c))
      .collect();
    self.retain_by_mask(&mask);
    dropped
  }

  fn retain_by_mask(&mut self, mask: &[bool]) {
    for row in &mut self.rows {
      let mut i = 0;
      row.retain(|_| {
        let k = mask.get(i).copied().unwrap_or(false);
        i += 1;
        k
      });
    }
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// Trim, lower-case and replace spaces with underscores. A leading byte-order
/// mark, as written by spreadsheet exports, is stripped first.
pub fn normalize_header(header: &str) -> String {
  header
    .trim_start_matches('\u{feff}')
    .trim()
    .to_lowercase()
    .replace(' ', "_")
}

/// The fixed rename map for a table, applied in order after header
/// normalization.
pub fn rename_map(table: Table) -> &'static [(&'static str, &'static str)] {
  match table {
    Table::Users => &[],
    Table::Incidents => &[
      ("incident_id", "id"),
      ("timestamp", "created_at"),
      ("date", "date_reported"),
      ("category", "incident_type"),
      ("type", "incident_type"),
    ],
    Table::DatasetMetadata => &[
      ("dataset_id", "id"),
      ("name", "dataset_name"),
      ("rows", "record_count"),
      ("columns", "file_size_mb"),
      ("uploaded_by", "source"),
      ("upload_date", "last_updated"),
    ],
    Table::Tickets => &[("ticket_id", "id"), ("subject", "issue")],
  }
}

/// Bring `frame` into the shape `table` expects: normalize headers, apply the
/// rename map and the table's defaulting rules.
///
/// Returns the names of columns removed as duplicates during normalization.
/// Columns the table does not know about are left in place; intersecting
/// with the live table is the caller's job.
pub fn reconcile(frame: &mut Frame, table: Table) -> Result<Vec<String>> {
  if !table.is_ingestible() {
    return Err(Error::NotIngestible(table));
  }

  let duplicates = frame.normalize_headers();

  for (from, to) in rename_map(table) {
    frame.rename(from, to);
  }

  match table {
    Table::DatasetMetadata => {
      if !frame.has_column("category") {
        frame.add_column("category", Value::Text(UNKNOWN.to_owned()));
      }
      frame.coerce_column("file_size_mb", ColumnType::Real)?;
    }
    Table::Tickets => fill_required_text(frame, "issue"),
    Table::Incidents | Table::Users => {}
  }

  Ok(duplicates)
}

/// Make sure `column` exists and holds non-empty text in every row,
/// substituting [`UNKNOWN`].
fn fill_required_text(frame: &mut Frame, column: &str) {
  if !frame.has_column(column) {
    frame.add_column(column, Value::Text(UNKNOWN.to_owned()));
    return;
  }
  frame.map_column(column, |cell| match cell {
    Value::Null => Value::Text(UNKNOWN.to_owned()),
    Value::Text(t) if t.trim().is_empty() => Value::Text(UNKNOWN.to_owned()),
    Value::Text(t) => Value::Text(t.trim().to_owned()),
    other => other,
  });
}

#[cfg(test)]
mod tests {
  use super::*;

  fn text(s: &str) -> Value { Value::Text(s.to_owned()) }

  fn frame(headers: &[&str], rows: &[&[&str]]) -> Frame {
    let mut f = Frame::new(headers.iter().copied());
    for row in rows {
      f.push_row(row.iter().map(|c| Value::from_cell(c)).collect()).unwrap();
    }
    f
  }

  #[test]
  fn headers_are_normalized_before_renaming() {
    let mut f = frame(&[" Incident ID", "Incident_Type", "Date"], &[&["7", "Phishing", "2024-01-02"]]);
    reconcile(&mut f, Table::Incidents).unwrap();
    assert_eq!(f.columns(), ["id", "incident_type", "date_reported"]);
  }

  #[test]
  fn bom_is_stripped_from_the_first_header() {
    assert_eq!(normalize_header("\u{feff}Dataset ID"), "dataset_id");
  }

  #[test]
  fn duplicate_headers_keep_the_first() {
    let mut f = frame(&["Name", "name "], &[&["a", "b"]]);
    let dropped = f.normalize_headers();
    assert_eq!(dropped, ["name "]);
    assert_eq!(f.columns(), ["name"]);
    assert_eq!(f.rows()[0], [text("a")]);
  }

  #[test]
  fn rename_never_clobbers_an_existing_column() {
    let mut f = frame(&["incident_id", "id"], &[&["1", "2"]]);
    reconcile(&mut f, Table::Incidents).unwrap();
    assert_eq!(f.columns(), ["incident_id", "id"]);
  }

  #[test]
  fn first_matching_rename_wins() {
    let mut f = frame(&["category", "type"], &[&["Malware", "ignored"]]);
    reconcile(&mut f, Table::Incidents).unwrap();
    assert_eq!(f.columns(), ["incident_type", "type"]);
  }

  #[test]
  fn dataset_metadata_renames_defaults_and_coerces() {
    let mut f = frame(
      &["dataset_id", "name", "rows", "columns", "uploaded_by", "upload_date"],
      &[&["1", "Customers", "5000", "12", "alice", "2024-03-01"]],
    );
    reconcile(&mut f, Table::DatasetMetadata).unwrap();

    assert_eq!(
      f.columns(),
      [
        "id",
        "dataset_name",
        "record_count",
        "file_size_mb",
        "source",
        "last_updated",
        "category"
      ]
    );
    let row = &f.rows()[0];
    assert_eq!(row[3], Value::Real(12.0));
    assert_eq!(row[6], text(UNKNOWN));
  }

  #[test]
  fn dataset_metadata_keeps_existing_category() {
    let mut f = frame(&["name", "category"], &[&["x", "Finance"]]);
    reconcile(&mut f, Table::DatasetMetadata).unwrap();
    assert_eq!(f.column_values("category").unwrap(), [&text("Finance")]);
  }

  #[test]
  fn non_numeric_size_is_a_coercion_error() {
    let mut f = frame(&["name", "columns"], &[&["x", "12"], &["y", "lots"]]);
    let err = reconcile(&mut f, Table::DatasetMetadata).unwrap_err();
    match err {
      Error::Coercion { column, row, value, expected } => {
        assert_eq!(column, "file_size_mb");
        assert_eq!(row, 2);
        assert_eq!(value, "lots");
        assert_eq!(expected, ColumnType::Real);
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn tickets_without_subject_get_unknown_issue() {
    let mut f = frame(&["ticket_id", "priority"], &[&["1", "High"], &["2", "Low"]]);
    reconcile(&mut f, Table::Tickets).unwrap();
    assert_eq!(f.column_values("issue").unwrap(), [&text(UNKNOWN), &text(UNKNOWN)]);
  }

  #[test]
  fn blank_subjects_become_unknown_and_others_are_trimmed() {
    let mut f = Frame::new(["Subject"]);
    f.push_row(vec![text("  VPN down  ")]).unwrap();
    f.push_row(vec![text("   ")]).unwrap();
    f.push_row(vec![Value::Null]).unwrap();
    reconcile(&mut f, Table::Tickets).unwrap();
    assert_eq!(
      f.column_values("issue").unwrap(),
      [&text("VPN down"), &text(UNKNOWN), &text(UNKNOWN)]
    );
  }

  #[test]
  fn users_cannot_be_reconciled() {
    let mut f = frame(&["username"], &[&["bob"]]);
    assert!(matches!(
      reconcile(&mut f, Table::Users),
      Err(Error::NotIngestible(Table::Users))
    ));
  }

  #[test]
  fn retain_columns_reports_dropped_names() {
    let mut f = frame(&["id", "extra_unmapped_col", "status"], &[&["1", "x", "open"]]);
    let dropped = f.retain_columns(|c| c != "extra_unmapped_col");
    assert_eq!(dropped, ["extra_unmapped_col"]);
    assert_eq!(f.columns(), ["id", "status"]);
    assert_eq!(f.rows()[0], [text("1"), text("open")]);
  }

  #[test]
  fn short_rows_are_padded() {
    let mut f = Frame::new(["a", "b"]);
    f.push_row(vec![text("1")]).unwrap();
    assert_eq!(f.rows()[0], [text("1"), Value::Null]);
  }

  #[test]
  fn integer_coercion_accepts_whole_floats() {
    assert_eq!(text("3.0").coerce(ColumnType::Integer), Ok(Value::Integer(3)));
    assert_eq!(text("3.5").coerce(ColumnType::Integer), Err("3.5".to_owned()));
    assert_eq!(Value::Null.coerce(ColumnType::Integer), Ok(Value::Null));
  }

  #[test]
  fn long_rows_are_rejected() {
    let mut f = Frame::new(["a", "b"]);
    f.push_row(vec![text("1"), text("2")]).unwrap();
    let err = f
      .push_row(vec![text("3"), text("4"), text("5")])
      .unwrap_err();
    assert!(matches!(err, Error::RowTooLong { row: 2, fields: 3, width: 2 }));
    assert_eq!(f.len(), 1);
  }
}
