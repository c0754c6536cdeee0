//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  /// The append lost every race against other writers; safe to resubmit.
  #[error("conflict: {0}")]
  Conflict(String),

  /// The worksheet backend could not be read or written.
  #[error("{0}")]
  DataSource(#[source] urgencias_core::Error),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<urgencias_core::Error> for ApiError {
  fn from(e: urgencias_core::Error) -> Self {
    use urgencias_core::Error as E;
    match e {
      E::DataSource(_) => ApiError::DataSource(e),
      E::WriteConflict { .. } => ApiError::Conflict(e.to_string()),
      E::UnknownStatus(_) | E::UnknownCategory(_) => {
        ApiError::BadRequest(e.to_string())
      }
      E::RowWidth { .. } => ApiError::Internal(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::DataSource(e) => {
        tracing::error!(error = %e, "worksheet backend failed");
        (StatusCode::BAD_GATEWAY, e.to_string())
      }
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
