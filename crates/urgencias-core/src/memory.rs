//! In-process worksheet store, used by tests and the server's `--in-memory`
//! mode.
//!
//! Reads and writes can be made to fail on demand to exercise the error paths
//! of the dataset.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use thiserror::Error;

use crate::{
  store::{Revision, Snapshot, TableStore, WriteOutcome},
  table::Table,
};

#[derive(Debug, Error)]
pub enum MemoryStoreError {
  #[error("simulated {0} failure")]
  Injected(&'static str),
  #[error("store lock poisoned")]
  Poisoned,
}

#[derive(Default)]
pub struct MemoryStore {
  sheets:      Mutex<HashMap<String, Snapshot>>,
  fail_reads:  AtomicBool,
  fail_writes: AtomicBool,
  reads:       AtomicUsize,
  writes:      AtomicUsize,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// A store holding `table` under `worksheet` at revision 1.
  pub fn with_sheet(worksheet: impl Into<String>, table: Table) -> Self {
    let store = Self::default();
    if let Ok(mut sheets) = store.sheets.lock() {
      sheets.insert(worksheet.into(), Snapshot {
        table,
        revision: Revision::INITIAL.next(),
      });
    }
    store
  }

  pub fn fail_reads(&self, fail: bool) {
    self.fail_reads.store(fail, Ordering::SeqCst);
  }

  pub fn fail_writes(&self, fail: bool) {
    self.fail_writes.store(fail, Ordering::SeqCst);
  }

  /// Number of `read` calls seen so far, failed ones included.
  pub fn read_count(&self) -> usize { self.reads.load(Ordering::SeqCst) }

  /// Number of `write` calls seen so far, failed ones included.
  pub fn write_count(&self) -> usize { self.writes.load(Ordering::SeqCst) }
}

impl TableStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn read(&self, worksheet: &str) -> Result<Snapshot, MemoryStoreError> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    if self.fail_reads.load(Ordering::SeqCst) {
      return Err(MemoryStoreError::Injected("read"));
    }
    let sheets = self.sheets.lock().map_err(|_| MemoryStoreError::Poisoned)?;
    Ok(sheets.get(worksheet).cloned().unwrap_or_else(|| Snapshot {
      table:    Table::default(),
      revision: Revision::INITIAL,
    }))
  }

  async fn write(
    &self,
    worksheet: &str,
    table: Table,
    expected: Revision,
  ) -> Result<WriteOutcome, MemoryStoreError> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(MemoryStoreError::Injected("write"));
    }
    let mut sheets =
      self.sheets.lock().map_err(|_| MemoryStoreError::Poisoned)?;
    let current = sheets
      .get(worksheet)
      .map_or(Revision::INITIAL, |s| s.revision);
    if current != expected {
      return Ok(WriteOutcome::Conflict { current });
    }
    let revision = current.next();
    sheets.insert(worksheet.to_owned(), Snapshot { table, revision });
    Ok(WriteOutcome::Written(revision))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn missing_worksheet_reads_empty() {
    let store = MemoryStore::new();
    let snap = store.read("nope").await.unwrap();
    assert!(snap.table.columns().is_empty());
    assert_eq!(snap.revision, Revision::INITIAL);
  }

  #[tokio::test]
  async fn stale_revision_is_a_conflict() {
    let store = MemoryStore::with_sheet("s", Table::new(["A"]));
    let outcome = store
      .write("s", Table::new(["A"]), Revision::INITIAL)
      .await
      .unwrap();
    assert_eq!(outcome, WriteOutcome::Conflict { current: Revision(1) });

    let outcome = store.write("s", Table::new(["A"]), Revision(1)).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Written(Revision(2)));
  }

  #[tokio::test]
  async fn injected_failures_surface_as_errors() {
    let store = MemoryStore::new();
    store.fail_reads(true);
    assert!(store.read("s").await.is_err());
    store.fail_writes(true);
    assert!(
      store
        .write("s", Table::default(), Revision::INITIAL)
        .await
        .is_err()
    );
    assert_eq!(store.read_count(), 1);
    assert_eq!(store.write_count(), 1);
  }
}
