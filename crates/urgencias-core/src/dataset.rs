//! [`Dataset`] — the incident worksheet as seen by the views.
//!
//! Reads go through a [`TtlCache`] so page loads within the TTL share one
//! remote read. Appends are read-modify-write against the store: the new row
//! is added to the cached snapshot and the whole table is written back,
//! guarded by the snapshot's [`Revision`]. When another writer got there
//! first, the append re-reads and tries again.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  append::append_record,
  cache::TtlCache,
  incident::IncidentDraft,
  store::{Revision, Snapshot, TableStore, WriteOutcome},
  summary::{Summary, normalize, summarize},
};

/// Name of the worksheet holding the incidents.
pub const DEFAULT_WORKSHEET: &str = "Base Urgencias 2026";

/// How long a read stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Read-modify-write attempts per append before giving up on a busy sheet.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// What a successful append reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendReceipt {
  /// Worksheet revision created by the write.
  pub revision: Revision,
  /// Row count of the worksheet after the write.
  pub rows:     usize,
}

pub struct Dataset<S> {
  store:        Arc<S>,
  worksheet:    String,
  cache:        Mutex<TtlCache<Arc<Snapshot>>>,
  append_lock:  Mutex<()>,
  max_attempts: u32,
}

impl<S: TableStore> Dataset<S> {
  pub fn new(store: Arc<S>, worksheet: impl Into<String>) -> Self {
    Self {
      store,
      worksheet: worksheet.into(),
      cache: Mutex::new(TtlCache::new(DEFAULT_TTL)),
      append_lock: Mutex::new(()),
      max_attempts: DEFAULT_MAX_ATTEMPTS,
    }
  }

  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.cache = Mutex::new(TtlCache::new(ttl));
    self
  }

  /// Clamped to at least one attempt.
  pub fn with_max_attempts(mut self, attempts: u32) -> Self {
    self.max_attempts = attempts.max(1);
    self
  }

  // ── Loading ───────────────────────────────────────────────────────────────

  /// The full, unfiltered worksheet. Served from the cache while fresh;
  /// otherwise read from the store and cached.
  ///
  /// A failed read leaves the cache as it was.
  pub async fn load(&self) -> Result<Arc<Snapshot>> {
    let mut cache = self.cache.lock().await;
    if let Some(snapshot) = cache.get() {
      debug!(
        worksheet = %self.worksheet,
        revision = %snapshot.revision,
        "cache hit"
      );
      return Ok(Arc::clone(snapshot));
    }
    let snapshot = Arc::new(self.fetch().await?);
    cache.put(Arc::clone(&snapshot));
    Ok(snapshot)
  }

  /// Counts and distributions over the rows that have a location.
  pub async fn summary(&self) -> Result<Summary> {
    let snapshot = self.load().await?;
    Ok(summarize(&normalize(&snapshot.table)))
  }

  /// Drop the cached snapshot; the next [`load`](Self::load) reads the store.
  pub async fn invalidate(&self) {
    self.cache.lock().await.invalidate();
    debug!(worksheet = %self.worksheet, "cache invalidated");
  }

  async fn fetch(&self) -> Result<Snapshot> {
    let snapshot = self
      .store
      .read(&self.worksheet)
      .await
      .map_err(Error::data_source)?;
    debug!(
      worksheet = %self.worksheet,
      revision = %snapshot.revision,
      rows = snapshot.table.len(),
      "read worksheet"
    );
    Ok(snapshot)
  }

  // ── Appending ─────────────────────────────────────────────────────────────

  /// Append `draft` as the last row of the worksheet.
  ///
  /// Starts from the current snapshot (cached if fresh). On success the cache
  /// is invalidated so the next load sees the new row. A store error is
  /// returned as-is and leaves the cache untouched; the row must be treated as
  /// unsaved. A revision conflict re-reads the worksheet into the cache and
  /// tries again, up to the configured limit.
  pub async fn append(&self, draft: &IncidentDraft) -> Result<AppendReceipt> {
    let _guard = self.append_lock.lock().await;

    let mut base = self.load().await?;
    for attempt in 1..=self.max_attempts {
      let table = append_record(&base.table, draft)?;
      let rows = table.len();

      let outcome = self
        .store
        .write(&self.worksheet, table, base.revision)
        .await
        .map_err(Error::data_source)?;

      match outcome {
        WriteOutcome::Written(revision) => {
          self.invalidate().await;
          info!(
            worksheet = %self.worksheet,
            %revision,
            rows,
            location = %draft.location_id,
            "incident appended"
          );
          return Ok(AppendReceipt { revision, rows });
        }
        WriteOutcome::Conflict { current } => {
          warn!(
            worksheet = %self.worksheet,
            expected = %base.revision,
            %current,
            attempt,
            "worksheet changed since it was read"
          );
          // The cached base is stale; replace it so later appends start
          // from the store's current revision even after giving up.
          base = Arc::new(self.fetch().await?);
          self.cache.lock().await.put(Arc::clone(&base));
        }
      }
    }

    Err(Error::WriteConflict {
      attempts: self.max_attempts,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::{
    incident::{Category, Status, columns},
    memory::MemoryStore,
    table::Table,
  };

  const SHEET: &str = DEFAULT_WORKSHEET;

  fn seeded() -> Arc<MemoryStore> {
    let table = Table::with_rows(columns::ALL, vec![
      vec![
        Some("02/01/2026".into()),
        Some("101".into()),
        None,
        None,
        Some("Sin Respuesta".into()),
        Some("Sanitario".into()),
      ],
      vec![
        Some("03/01/2026".into()),
        None,
        None,
        None,
        Some("Cerrado".into()),
        Some("Eléctrico".into()),
      ],
    ])
    .unwrap();
    Arc::new(MemoryStore::with_sheet(SHEET, table))
  }

  fn draft(location: &str) -> IncidentDraft {
    IncidentDraft::new(
      NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
      location,
      Status::InProgress,
      Category::Refrigeration,
    )
  }

  // ── load ──────────────────────────────────────────────────────────────────

  #[tokio::test(start_paused = true)]
  async fn loads_within_ttl_share_one_read() {
    let store = seeded();
    let ds = Dataset::new(store.clone(), SHEET);

    let a = ds.load().await.unwrap();
    tokio::time::advance(Duration::from_secs(9 * 60)).await;
    let b = ds.load().await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(store.read_count(), 1);

    tokio::time::advance(Duration::from_secs(60)).await;
    ds.load().await.unwrap();
    assert_eq!(store.read_count(), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn invalidate_forces_a_fresh_read() {
    let store = seeded();
    let ds = Dataset::new(store.clone(), SHEET);
    ds.load().await.unwrap();
    ds.invalidate().await;
    ds.load().await.unwrap();
    assert_eq!(store.read_count(), 2);
  }

  #[tokio::test]
  async fn read_failure_is_a_data_source_error() {
    let store = seeded();
    store.fail_reads(true);
    let ds = Dataset::new(store, SHEET);
    assert!(matches!(ds.load().await, Err(Error::DataSource(_))));
    assert!(matches!(ds.summary().await, Err(Error::DataSource(_))));
  }

  #[tokio::test]
  async fn load_returns_unfiltered_rows_and_summary_filters() {
    let ds = Dataset::new(seeded(), SHEET);
    assert_eq!(ds.load().await.unwrap().table.len(), 2);

    let summary = ds.summary().await.unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.closed, 0);
  }

  // ── append ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn append_persists_and_next_load_sees_it() {
    let store = seeded();
    let ds = Dataset::new(store.clone(), SHEET);
    ds.load().await.unwrap();

    let receipt = ds.append(&draft("230")).await.unwrap();
    assert_eq!(receipt.rows, 3);
    assert_eq!(receipt.revision, Revision(2));

    let snapshot = ds.load().await.unwrap();
    assert_eq!(snapshot.revision, Revision(2));
    assert_eq!(snapshot.table.len(), 3);
    assert_eq!(snapshot.table.cell(2, 1), Some("230"));
    assert_eq!(ds.summary().await.unwrap().in_progress, 1);
  }

  #[tokio::test]
  async fn empty_location_is_appended_but_not_summarised() {
    let ds = Dataset::new(seeded(), SHEET);
    let before = ds.summary().await.unwrap();

    ds.append(&draft("")).await.unwrap();

    assert_eq!(ds.load().await.unwrap().table.len(), 3);
    assert_eq!(ds.summary().await.unwrap(), before);
  }

  #[tokio::test(start_paused = true)]
  async fn failed_write_keeps_the_cache() {
    let store = seeded();
    let ds = Dataset::new(store.clone(), SHEET);
    let before = ds.load().await.unwrap();

    store.fail_writes(true);
    let err = ds.append(&draft("230")).await.unwrap_err();
    assert!(matches!(err, Error::DataSource(_)));

    let after = ds.load().await.unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.table.len(), 2);
    assert_eq!(store.read_count(), 1);
  }

  #[tokio::test]
  async fn concurrent_writer_is_not_overwritten() {
    let store = seeded();
    let ds = Dataset::new(store.clone(), SHEET);
    let stale = ds.load().await.unwrap();

    // Another process appends behind the cache's back.
    let mut theirs = stale.table.clone();
    theirs
      .push_row(vec![Some("04/01/2026".into()), Some("555".into())])
      .unwrap();
    let outcome = store.write(SHEET, theirs, stale.revision).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Written(Revision(2)));

    let receipt = ds.append(&draft("230")).await.unwrap();
    assert_eq!(receipt.revision, Revision(3));
    assert_eq!(receipt.rows, 4);

    let table = &ds.load().await.unwrap().table;
    assert_eq!(table.cell(2, 1), Some("555"));
    assert_eq!(table.cell(3, 1), Some("230"));
  }

  #[tokio::test]
  async fn gives_up_after_max_attempts() {
    let store = Arc::new(MemoryStore::new());
    let ds = Dataset::new(store.clone(), SHEET).with_max_attempts(1);
    ds.load().await.unwrap();

    store
      .write(SHEET, Table::new(columns::ALL), Revision::INITIAL)
      .await
      .unwrap();

    let err = ds.append(&draft("230")).await.unwrap_err();
    assert!(matches!(err, Error::WriteConflict { attempts: 1 }));
  }

  #[tokio::test(start_paused = true)]
  async fn conflict_refreshes_the_cached_snapshot() {
    let store = seeded();
    let ds = Dataset::new(store.clone(), SHEET).with_max_attempts(1);
    let stale = ds.load().await.unwrap();

    let mut theirs = stale.table.clone();
    theirs
      .push_row(vec![Some("04/01/2026".into()), Some("555".into())])
      .unwrap();
    store.write(SHEET, theirs, stale.revision).await.unwrap();

    let err = ds.append(&draft("230")).await.unwrap_err();
    assert!(matches!(err, Error::WriteConflict { attempts: 1 }));
    assert_eq!(ds.load().await.unwrap().revision, Revision(2));

    // Well within the TTL, the retry starts from the current revision.
    tokio::time::advance(Duration::from_secs(60)).await;
    let receipt = ds.append(&draft("231")).await.unwrap();
    assert_eq!(receipt.revision, Revision(3));
    assert_eq!(receipt.rows, 4);

    let snapshot = ds.load().await.unwrap();
    assert_eq!(snapshot.revision, Revision(3));
    assert_eq!(snapshot.table.cell(2, 1), Some("555"));
    assert_eq!(snapshot.table.cell(3, 1), Some("231"));
  }

  #[tokio::test]
  async fn first_append_to_a_new_worksheet_writes_the_header() {
    let store = Arc::new(MemoryStore::new());
    let ds = Dataset::new(store, "Nueva");
    ds.append(&draft("12")).await.unwrap();

    let snapshot = ds.load().await.unwrap();
    assert_eq!(snapshot.table.columns(), columns::ALL);
    assert_eq!(snapshot.table.len(), 1);
  }
}
