//! [`SqliteStore`] — the SQLite implementation of [`TableStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::debug;
use urgencias_core::{
  store::{Revision, Snapshot, TableStore, WriteOutcome},
  table::Table,
};

use crate::{
  Result,
  encode::{
    RawWorksheet, decode_revision, encode_columns, encode_revision,
    encode_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A worksheet store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store (tests).
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Names of all worksheets that have been written at least once.
  pub async fn worksheets(&self) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM worksheets ORDER BY name")?;
        let names = stmt
          .query_map([], |r| r.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
      })
      .await?;
    Ok(names)
  }
}

// ─── TableStore impl ─────────────────────────────────────────────────────────

impl TableStore for SqliteStore {
  type Error = crate::Error;

  async fn read(&self, worksheet: &str) -> Result<Snapshot> {
    let name = worksheet.to_owned();

    let raw: Option<RawWorksheet> = self
      .conn
      .call(move |conn| {
        let header: Option<(i64, String)> = conn
          .query_row(
            "SELECT revision, columns_json FROM worksheets WHERE name = ?1",
            rusqlite::params![name],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        let Some((revision, columns_json)) = header else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT cells_json FROM worksheet_rows
           WHERE worksheet = ?1
           ORDER BY position",
        )?;
        let rows_json = stmt
          .query_map(rusqlite::params![name], |r| r.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(RawWorksheet {
          name,
          revision,
          columns_json,
          rows_json,
        }))
      })
      .await?;

    match raw {
      Some(raw) => raw.decode(),
      None => Ok(Snapshot {
        table:    Table::default(),
        revision: Revision::INITIAL,
      }),
    }
  }

  async fn write(
    &self,
    worksheet: &str,
    table: Table,
    expected: Revision,
  ) -> Result<WriteOutcome> {
    let name         = worksheet.to_owned();
    let expected_i64 = encode_revision(worksheet, expected)?;
    let columns_json = encode_columns(table.columns())?;
    let rows_json    = table
      .rows()
      .iter()
      .map(encode_row)
      .collect::<Result<Vec<_>>>()?;

    // `Err(current)` when the revision check fails.
    let result: std::result::Result<i64, i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current: i64 = tx
          .query_row(
            "SELECT revision FROM worksheets WHERE name = ?1",
            rusqlite::params![name],
            |r| r.get(0),
          )
          .optional()?
          .unwrap_or(0);

        if current != expected_i64 {
          return Ok(Err(current));
        }
        let next = current + 1;

        tx.execute(
          "INSERT INTO worksheets (name, revision, columns_json)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (name) DO UPDATE SET
             revision     = excluded.revision,
             columns_json = excluded.columns_json",
          rusqlite::params![name, next, columns_json],
        )?;
        tx.execute(
          "DELETE FROM worksheet_rows WHERE worksheet = ?1",
          rusqlite::params![name],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO worksheet_rows (worksheet, position, cells_json)
             VALUES (?1, ?2, ?3)",
          )?;
          for (position, cells) in rows_json.iter().enumerate() {
            stmt.execute(rusqlite::params![name, position as i64, cells])?;
          }
        }
        tx.commit()?;
        Ok(Ok(next))
      })
      .await?;

    match result {
      Ok(next) => {
        let revision = decode_revision(worksheet, next)?;
        debug!(worksheet, %revision, "worksheet overwritten");
        Ok(WriteOutcome::Written(revision))
      }
      Err(current) => Ok(WriteOutcome::Conflict {
        current: decode_revision(worksheet, current)?,
      }),
    }
  }
}
