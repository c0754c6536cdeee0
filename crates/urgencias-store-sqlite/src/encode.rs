//! Encoding and decoding helpers between worksheet values and the plain-text
//! representations stored in SQLite columns.
//!
//! Headers and rows are stored as compact JSON arrays; a missing cell is
//! `null`. Revisions are stored as SQLite integers.

use urgencias_core::{
  store::{Revision, Snapshot},
  table::{Row, Table},
};

use crate::{Error, Result};

// ─── Revision ────────────────────────────────────────────────────────────────

pub fn encode_revision(worksheet: &str, r: Revision) -> Result<i64> {
  i64::try_from(r.0).map_err(|_| Error::Corrupt {
    worksheet: worksheet.to_owned(),
    reason:    format!("revision {} out of range", r.0),
  })
}

pub fn decode_revision(worksheet: &str, n: i64) -> Result<Revision> {
  u64::try_from(n).map(Revision).map_err(|_| Error::Corrupt {
    worksheet: worksheet.to_owned(),
    reason:    format!("negative revision {n}"),
  })
}

// ─── Header and rows ─────────────────────────────────────────────────────────

pub fn encode_columns(columns: &[String]) -> Result<String> {
  Ok(serde_json::to_string(columns)?)
}

pub fn encode_row(row: &Row) -> Result<String> { Ok(serde_json::to_string(row)?) }

/// Raw column values for one worksheet, as read from SQLite.
pub struct RawWorksheet {
  pub name:         String,
  pub revision:     i64,
  pub columns_json: String,
  pub rows_json:    Vec<String>,
}

impl RawWorksheet {
  pub fn decode(self) -> Result<Snapshot> {
    let revision = decode_revision(&self.name, self.revision)?;
    let columns: Vec<String> = serde_json::from_str(&self.columns_json)?;
    let rows = self
      .rows_json
      .iter()
      .map(|r| serde_json::from_str::<Row>(r))
      .collect::<Result<Vec<_>, _>>()?;
    let table = Table::with_rows(columns, rows)?;
    Ok(Snapshot { table, revision })
  }
}
