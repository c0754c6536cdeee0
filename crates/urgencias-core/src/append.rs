//! Building the table that results from appending one incident.

use tracing::warn;

use crate::{
  Result,
  incident::{IncidentDraft, columns, header_matches},
  table::{Row, Table},
};

/// Return `table` with `draft` added as its last row.
///
/// The new row follows the column set of `table` exactly: columns the draft
/// has no value for get a missing cell, and draft fields with no matching
/// column are dropped. A table with no columns at all (a worksheet that was
/// never written) takes the canonical incident header.
pub fn append_record(table: &Table, draft: &IncidentDraft) -> Result<Table> {
  let mut out = if table.columns().is_empty() {
    Table::with_rows(columns::ALL, table.rows().to_vec())?
  } else {
    table.clone()
  };

  let cells = draft.cells();
  let row: Row = out
    .columns()
    .iter()
    .map(|column| {
      cells
        .iter()
        .find(|(header, _)| header_matches(header, column))
        .and_then(|(_, cell)| cell.clone())
    })
    .collect();

  for (header, cell) in &cells {
    if cell.is_some() && out.column_index(header).is_none() {
      warn!(column = *header, "worksheet has no such column; field dropped");
    }
  }

  out.push_row(row)?;
  Ok(out)
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::{
    incident::{Category, Status},
    summary::{normalize, summarize},
  };

  fn draft(location: &str) -> IncidentDraft {
    let mut d = IncidentDraft::new(
      NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
      location,
      Status::Scheduled,
      Category::Other,
    );
    d.description = Some("Pérdida de agua en baño".into());
    d
  }

  fn existing() -> Table {
    Table::with_rows(columns::ALL, vec![
      vec![Some("10/01/2026".into()), Some("101".into())],
      vec![Some("11/01/2026".into()), Some("102".into())],
    ])
    .unwrap()
  }

  #[test]
  fn appends_last_and_keeps_existing_rows() {
    let before = existing();
    let after = append_record(&before, &draft("230")).unwrap();

    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after.rows()[..before.len()], before.rows());
    assert_eq!(after.columns(), before.columns());

    let last = after.rows().last().unwrap();
    assert_eq!(last[0].as_deref(), Some("01/03/2026"));
    assert_eq!(last[1].as_deref(), Some("230"));
    assert_eq!(last[4].as_deref(), Some("Programado"));
    assert_eq!(last[5].as_deref(), Some("Otro"));
    assert_eq!(last[6].as_deref(), Some("Pérdida de agua en baño"));
    assert_eq!(last[7], None);
  }

  #[test]
  fn follows_existing_column_order_and_extra_columns() {
    let before = Table::new(["PRIORIDAD", "estado", "Local", "FECHA"]);
    let after = append_record(&before, &draft("7")).unwrap();

    assert_eq!(after.columns(), before.columns());
    assert_eq!(after.rows()[0], vec![
      None,
      Some("Programado".into()),
      Some("7".into()),
      Some("01/03/2026".into()),
    ]);
  }

  #[test]
  fn headerless_table_gets_canonical_columns() {
    let after = append_record(&Table::default(), &draft("9")).unwrap();
    assert_eq!(after.columns(), columns::ALL);
    assert_eq!(after.len(), 1);
  }

  #[test]
  fn empty_location_is_stored_but_not_summarised() {
    let after = append_record(&existing(), &draft("")).unwrap();
    assert_eq!(after.len(), 3);
    assert_eq!(after.rows()[2][1], None);

    let s = summarize(&normalize(&after));
    assert_eq!(s.total, 2);
  }
}
