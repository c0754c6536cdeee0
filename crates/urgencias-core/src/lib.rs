//! Core types and logic for the urgencias incident dashboard.
//!
//! This crate owns the incident table model, the [`store::TableStore`]
//! abstraction over the worksheet backend, and the three pieces of logic the
//! views are built on: loading with a TTL cache, aggregation, and appending.
//! It is free of HTTP and database dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod append;
pub mod cache;
pub mod dataset;
pub mod error;
pub mod incident;
pub mod memory;
pub mod store;
pub mod summary;
pub mod table;

pub use error::{Error, Result};
