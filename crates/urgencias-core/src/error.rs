//! Error types for `urgencias-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Reading from or writing to the worksheet backend failed.
  #[error("data source error: {0}")]
  DataSource(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("worksheet kept changing; append gave up after {attempts} attempts")]
  WriteConflict { attempts: u32 },

  #[error("unknown status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown category: {0:?}")]
  UnknownCategory(String),

  #[error("row {row} has {found} cells but the table has {expected} columns")]
  RowWidth {
    row:      usize,
    expected: usize,
    found:    usize,
  },
}

impl Error {
  /// Wrap a backend error as [`Error::DataSource`].
  pub fn data_source<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::DataSource(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
