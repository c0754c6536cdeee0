//! Handlers backing the summary view.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/summary` | Counts and distributions over rows with a location |
//! | `GET`  | `/options` | Status and category choices for the entry form |

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;
use urgencias_core::{
  dataset::Dataset,
  incident::{Category, Status},
  store::TableStore,
  summary::Summary,
};

use crate::error::ApiError;

/// `GET /summary`
pub async fn handler<S>(
  State(dataset): State<Arc<Dataset<S>>>,
) -> Result<Json<Summary>, ApiError>
where
  S: TableStore + 'static,
{
  Ok(Json(dataset.summary().await?))
}

/// The closed value sets the entry form offers, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormOptions {
  pub statuses:   Vec<Status>,
  pub categories: Vec<Category>,
}

/// `GET /options`
pub async fn options() -> Json<FormOptions> {
  Json(FormOptions {
    statuses:   Status::iter().collect(),
    categories: Category::iter().collect(),
  })
}
