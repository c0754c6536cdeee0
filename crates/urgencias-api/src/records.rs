//! Handlers for `/records` — the raw worksheet and the entry form.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/records` | Full worksheet, unfiltered, with its revision |
//! | `POST` | `/records` | Body: [`NewIncidentBody`]; returns 201 + [`AppendReceipt`] |
//! | `POST` | `/refresh` | Drop the cached worksheet; returns 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use urgencias_core::{
  dataset::{AppendReceipt, Dataset},
  incident::{Category, IncidentDraft, Status},
  store::{Snapshot, TableStore},
};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /records`
pub async fn list<S>(
  State(dataset): State<Arc<Dataset<S>>>,
) -> Result<Json<Snapshot>, ApiError>
where
  S: TableStore + 'static,
{
  let snapshot = dataset.load().await?;
  Ok(Json(Snapshot::clone(&snapshot)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /records`.
///
/// `status` and `category` take the sheet labels (`"Sin Respuesta"`) or their
/// snake_case names (`"unanswered"`); anything else is rejected before the
/// handler runs.
#[derive(Debug, Deserialize)]
pub struct NewIncidentBody {
  /// Defaults to today's local date.
  pub date:         Option<NaiveDate>,
  #[serde(default)]
  pub location_id:  String,
  pub address:      Option<String>,
  pub neighborhood: Option<String>,
  pub status:       Status,
  pub category:     Category,
  pub description:  Option<String>,
  pub assignee:     Option<String>,
}

impl From<NewIncidentBody> for IncidentDraft {
  fn from(b: NewIncidentBody) -> Self {
    IncidentDraft {
      date:         b.date.unwrap_or_else(|| Local::now().date_naive()),
      location_id:  b.location_id,
      address:      b.address,
      neighborhood: b.neighborhood,
      status:       b.status,
      category:     b.category,
      description:  b.description,
      assignee:     b.assignee,
    }
  }
}

/// `POST /records` — returns 201 + the [`AppendReceipt`].
///
/// A 502 means the row was not saved and the caller should offer a retry.
pub async fn create<S>(
  State(dataset): State<Arc<Dataset<S>>>,
  Json(body): Json<NewIncidentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TableStore + 'static,
{
  let receipt: AppendReceipt = dataset.append(&IncidentDraft::from(body)).await?;
  Ok((StatusCode::CREATED, Json(receipt)))
}

// ─── Refresh ──────────────────────────────────────────────────────────────────

/// `POST /refresh`
pub async fn refresh<S>(State(dataset): State<Arc<Dataset<S>>>) -> StatusCode
where
  S: TableStore + 'static,
{
  dataset.invalidate().await;
  StatusCode::NO_CONTENT
}
