//! JSON REST API for the urgencias dashboard.
//!
//! Exposes an axum [`Router`] backed by a [`Dataset`] over any
//! [`TableStore`]. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", urgencias_api::api_router(dataset.clone()))
//! ```

pub mod error;
pub mod records;
pub mod summary;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use urgencias_core::{dataset::Dataset, store::TableStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `dataset`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(dataset: Arc<Dataset<S>>) -> Router<()>
where
  S: TableStore + 'static,
{
  Router::new()
    // Summary view
    .route("/summary", get(summary::handler::<S>))
    .route("/options", get(summary::options))
    // Raw browser + entry form
    .route("/records", get(records::list::<S>).post(records::create::<S>))
    .route("/refresh", post(records::refresh::<S>))
    .with_state(dataset)
}
