//! A worksheet's contents: named columns and rows of text cells.
//!
//! A cell is `None` when the sheet has nothing in it. Every row holds exactly
//! one cell per column; rows shorter than the header (spreadsheet backends
//! commonly drop trailing empty cells) are padded on construction.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, incident::header_matches};

/// One worksheet row, aligned with [`Table::columns`].
pub type Row = Vec<Option<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
  columns: Vec<String>,
  rows:    Vec<Row>,
}

/// Unchecked wire form of [`Table`].
#[derive(Deserialize)]
struct RawTable {
  columns: Vec<String>,
  #[serde(default)]
  rows:    Vec<Row>,
}

impl TryFrom<RawTable> for Table {
  type Error = Error;

  fn try_from(raw: RawTable) -> Result<Self> {
    Table::with_rows(raw.columns, raw.rows)
  }
}

impl Table {
  /// An empty table with the given header.
  pub fn new<I, C>(columns: I) -> Self
  where
    I: IntoIterator<Item = C>,
    C: Into<String>,
  {
    Self {
      columns: columns.into_iter().map(Into::into).collect(),
      rows:    Vec::new(),
    }
  }

  /// Build a table from a header and rows, padding short rows with missing
  /// cells. Rows wider than the header are rejected.
  pub fn with_rows<I, C>(columns: I, rows: Vec<Row>) -> Result<Self>
  where
    I: IntoIterator<Item = C>,
    C: Into<String>,
  {
    let mut table = Self::new(columns);
    for row in rows {
      table.push_row(row)?;
    }
    Ok(table)
  }

  pub fn columns(&self) -> &[String] { &self.columns }

  pub fn rows(&self) -> &[Row] { &self.rows }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Position of the column whose header matches `name`.
  pub fn column_index(&self, name: &str) -> Option<usize> {
    self.columns.iter().position(|c| header_matches(c, name))
  }

  /// The text in `row` under column `column`, if any.
  pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
    self.rows.get(row)?.get(column)?.as_deref()
  }

  /// Iterate over the cells of the column named `name`. Yields nothing if the
  /// table has no such column.
  pub fn column_cells<'a>(
    &'a self,
    name: &str,
  ) -> impl Iterator<Item = Option<&'a str>> + use<'a> {
    let index = self.column_index(name);
    self
      .rows
      .iter()
      .filter_map(move |row| index.map(|i| row[i].as_deref()))
  }

  /// Append a row after the existing ones.
  pub fn push_row(&mut self, mut row: Row) -> Result<()> {
    let expected = self.columns.len();
    if row.len() > expected {
      return Err(Error::RowWidth {
        row: self.rows.len(),
        expected,
        found: row.len(),
      });
    }
    row.resize(expected, None);
    self.rows.push(row);
    Ok(())
  }

  /// A copy of this table keeping only the rows for which `keep` is true, in
  /// their original order.
  pub fn filter_rows(&self, mut keep: impl FnMut(&Row) -> bool) -> Self {
    Self {
      columns: self.columns.clone(),
      rows:    self.rows.iter().filter(|r| keep(r)).cloned().collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cell(s: &str) -> Option<String> { Some(s.to_owned()) }

  #[test]
  fn short_rows_are_padded() {
    let table =
      Table::with_rows(["A", "B", "C"], vec![vec![cell("1")]]).unwrap();
    assert_eq!(table.rows()[0], vec![cell("1"), None, None]);
  }

  #[test]
  fn wide_rows_are_rejected() {
    let err = Table::with_rows(["A"], vec![vec![cell("1"), cell("2")]])
      .unwrap_err();
    assert!(matches!(
      err,
      Error::RowWidth { row: 0, expected: 1, found: 2 }
    ));
  }

  #[test]
  fn column_lookup_ignores_case_and_padding() {
    let table = Table::new(["FECHA", " Local "]);
    assert_eq!(table.column_index("LOCAL"), Some(1));
    assert_eq!(table.column_index("ESTADO"), None);
  }

  #[test]
  fn column_cells_of_missing_column_is_empty() {
    let table = Table::with_rows(["A"], vec![vec![cell("x")]]).unwrap();
    assert_eq!(table.column_cells("A").collect::<Vec<_>>(), vec![Some("x")]);
    assert_eq!(table.column_cells("B").count(), 0);
  }

  #[test]
  fn deserialising_validates_widths() {
    let ok: Table =
      serde_json::from_str(r#"{"columns":["A","B"],"rows":[["x"]]}"#).unwrap();
    assert_eq!(ok.rows()[0], vec![cell("x"), None]);

    let bad = serde_json::from_str::<Table>(
      r#"{"columns":["A"],"rows":[["x","y"]]}"#,
    );
    assert!(bad.is_err());
  }
}
