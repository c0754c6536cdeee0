//! Normalisation and aggregation for the summary view.
//!
//! Both functions are pure. [`normalize`] decides which rows the summary sees;
//! [`summarize`] turns those rows into counts and chart distributions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  incident::{Category, Status, columns},
  table::Table,
};

// ─── Normalisation ───────────────────────────────────────────────────────────

/// Drop every row without a usable location: the `LOCAL` cell is missing, or
/// blank once trimmed. Kept rows are unchanged and stay in order.
///
/// A sheet with no `LOCAL` column has no usable locations at all.
pub fn normalize(table: &Table) -> Table {
  match table.column_index(columns::LOCATION) {
    Some(i) => table.filter_rows(|row| {
      row[i].as_deref().is_some_and(|v| !v.trim().is_empty())
    }),
    None => table.filter_rows(|_| false),
  }
}

// ─── Summary types ───────────────────────────────────────────────────────────

/// A distribution key: a recognised value, or the raw text of a cell that
/// matched none of the known labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label<T> {
  Known(T),
  Other(String),
}

impl<T: fmt::Display> fmt::Display for Label<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Label::Known(v) => fmt::Display::fmt(v, f),
      Label::Other(s) => f.write_str(s),
    }
  }
}

/// One slice of a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket<T> {
  pub label: Label<T>,
  pub count: usize,
}

/// Everything the summary view renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  pub total:                 usize,
  /// Incidents nobody has answered yet.
  pub pending:               usize,
  pub in_progress:           usize,
  pub closed:                usize,
  /// Count per distinct status, largest first.
  pub status_distribution:   Vec<Bucket<Status>>,
  /// Count per distinct category, largest first.
  pub category_distribution: Vec<Bucket<Category>>,
}

impl Summary {
  /// Count for one status, zero if absent.
  pub fn status_count(&self, status: Status) -> usize {
    count_of(&self.status_distribution, &Label::Known(status))
  }

  /// Count for one category, zero if absent.
  pub fn category_count(&self, category: Category) -> usize {
    count_of(&self.category_distribution, &Label::Known(category))
  }
}

fn count_of<T: PartialEq>(buckets: &[Bucket<T>], label: &Label<T>) -> usize {
  buckets
    .iter()
    .find(|b| &b.label == label)
    .map_or(0, |b| b.count)
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Compute counts and distributions over `table`. Blank status or category
/// cells count towards `total` but appear in no distribution.
pub fn summarize(table: &Table) -> Summary {
  let status_distribution =
    distribution(table, columns::STATUS, |s| Status::parse_label(s).ok());
  let category_distribution =
    distribution(table, columns::CATEGORY, |s| Category::parse_label(s).ok());

  let mut summary = Summary {
    total: table.len(),
    status_distribution,
    category_distribution,
    ..Summary::default()
  };
  summary.pending = summary.status_count(Status::Unanswered);
  summary.in_progress = summary.status_count(Status::InProgress);
  summary.closed = summary.status_count(Status::Closed);
  summary
}

/// Tally the non-blank cells of `column`. Buckets are ordered by count,
/// largest first, ties broken by first appearance.
fn distribution<T: PartialEq>(
  table: &Table,
  column: &str,
  parse: impl Fn(&str) -> Option<T>,
) -> Vec<Bucket<T>> {
  let mut buckets: Vec<Bucket<T>> = Vec::new();
  for raw in table.column_cells(column).flatten() {
    let raw = raw.trim();
    if raw.is_empty() {
      continue;
    }
    let label = parse(raw)
      .map_or_else(|| Label::Other(raw.to_owned()), Label::Known);
    match buckets.iter_mut().find(|b| b.label == label) {
      Some(bucket) => bucket.count += 1,
      None => buckets.push(Bucket { label, count: 1 }),
    }
  }
  // Stable, so ties keep first-seen order.
  buckets.sort_by(|a, b| b.count.cmp(&a.count));
  buckets
}
