//! The worksheet backend the dataset reads and writes.
//!
//! The store is addressed by worksheet name and only knows two operations:
//! read the whole table, and overwrite the whole table. Every successful write
//! bumps a [`Revision`]; writes carry the revision they were computed from so
//! a concurrent writer is detected instead of silently overwritten.

use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};

use crate::table::Table;

// ─── Revision ────────────────────────────────────────────────────────────────

/// Monotonic version of a worksheet's contents. A worksheet that has never
/// been written is at [`Revision::INITIAL`].
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct Revision(pub u64);

impl Revision {
  pub const INITIAL: Self = Self(0);

  pub fn next(self) -> Self { Self(self.0 + 1) }
}

impl fmt::Display for Revision {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "r{}", self.0)
  }
}

// ─── Read / write results ────────────────────────────────────────────────────

/// The full contents of a worksheet as of one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub table:    Table,
  pub revision: Revision,
}

/// Result of a conditional overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
  /// The table was replaced; the worksheet is now at this revision.
  Written(Revision),
  /// Someone else wrote first; nothing was changed.
  Conflict { current: Revision },
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a worksheet backend.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait TableStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the entire worksheet. A worksheet that does not exist yet reads as
  /// an empty table with no columns at [`Revision::INITIAL`].
  fn read<'a>(
    &'a self,
    worksheet: &'a str,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + 'a;

  /// Replace the entire worksheet with `table`, provided it is still at
  /// `expected`. The write is all-or-nothing.
  fn write<'a>(
    &'a self,
    worksheet: &'a str,
    table: Table,
    expected: Revision,
  ) -> impl Future<Output = Result<WriteOutcome, Self::Error>> + Send + 'a;
}
