//! Error type for `urgencias-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] urgencias_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A stored value that cannot have been written by this crate.
  #[error("corrupt worksheet {worksheet:?}: {reason}")]
  Corrupt { worksheet: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
