//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::NaiveDate;
use urgencias_core::{
  dataset::Dataset,
  incident::{Category, IncidentDraft, Status, columns},
  store::{Revision, TableStore, WriteOutcome},
  table::Table,
};

use crate::SqliteStore;

const SHEET: &str = "Base Urgencias 2026";

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn sample() -> Table {
  Table::with_rows(columns::ALL, vec![
    vec![
      Some("05/01/2026".into()),
      Some("101".into()),
      Some("Av. Corrientes 900".into()),
      Some("Almagro".into()),
      Some("Sin Respuesta".into()),
      Some("Refrigeración".into()),
      Some("Cámara de frío no enfría".into()),
      None,
    ],
    vec![Some("06/01/2026".into()), None],
  ])
  .unwrap()
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_worksheet_reads_empty() {
  let s = store().await;
  let snap = s.read(SHEET).await.unwrap();
  assert_eq!(snap.revision, Revision::INITIAL);
  assert!(snap.table.columns().is_empty());
  assert!(snap.table.is_empty());
}

#[tokio::test]
async fn write_then_read_preserves_cells_and_order() {
  let s = store().await;
  let table = sample();

  let outcome = s.write(SHEET, table.clone(), Revision::INITIAL).await.unwrap();
  assert_eq!(outcome, WriteOutcome::Written(Revision(1)));

  let snap = s.read(SHEET).await.unwrap();
  assert_eq!(snap.revision, Revision(1));
  assert_eq!(snap.table, table);
  assert_eq!(snap.table.cell(1, 1), None);
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn overwrite_replaces_all_rows() {
  let s = store().await;
  s.write(SHEET, sample(), Revision::INITIAL).await.unwrap();

  let smaller = Table::with_rows(["A"], vec![vec![Some("x".into())]]).unwrap();
  let outcome = s.write(SHEET, smaller.clone(), Revision(1)).await.unwrap();
  assert_eq!(outcome, WriteOutcome::Written(Revision(2)));

  let snap = s.read(SHEET).await.unwrap();
  assert_eq!(snap.table, smaller);
}

#[tokio::test]
async fn stale_revision_conflicts_and_changes_nothing() {
  let s = store().await;
  s.write(SHEET, sample(), Revision::INITIAL).await.unwrap();

  let outcome = s
    .write(SHEET, Table::new(["A"]), Revision::INITIAL)
    .await
    .unwrap();
  assert_eq!(outcome, WriteOutcome::Conflict { current: Revision(1) });

  let snap = s.read(SHEET).await.unwrap();
  assert_eq!(snap.table, sample());
}

#[tokio::test]
async fn worksheets_are_independent() {
  let s = store().await;
  s.write("a", sample(), Revision::INITIAL).await.unwrap();
  s.write("b", Table::new(["X"]), Revision::INITIAL).await.unwrap();

  assert_eq!(s.read("a").await.unwrap().table.len(), 2);
  assert_eq!(s.read("b").await.unwrap().table.len(), 0);
  assert_eq!(s.worksheets().await.unwrap(), vec!["a", "b"]);
}

// ─── Through the dataset ─────────────────────────────────────────────────────

#[tokio::test]
async fn dataset_append_round_trips_through_sqlite() {
  let s = Arc::new(store().await);
  s.write(SHEET, sample(), Revision::INITIAL).await.unwrap();

  let ds = Dataset::new(s.clone(), SHEET);
  let mut draft = IncidentDraft::new(
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
    "230",
    Status::Closed,
    Category::Electrical,
  );
  draft.assignee = Some("Marta".into());

  let receipt = ds.append(&draft).await.unwrap();
  assert_eq!(receipt.rows, 3);

  let snap = s.read(SHEET).await.unwrap();
  assert_eq!(snap.revision, receipt.revision);
  assert_eq!(&snap.table.rows()[..2], sample().rows());
  assert_eq!(snap.table.cell(2, 0), Some("01/03/2026"));
  assert_eq!(snap.table.cell(2, 7), Some("Marta"));

  let summary = ds.summary().await.unwrap();
  assert_eq!(summary.total, 2);
  assert_eq!(summary.closed, 1);
  assert_eq!(summary.pending, 1);
}
