//! Roster core: spreadsheet roster ingestion over a document store.
//!
//! An upload flows through the pipeline leaf-first:
//!
//! 1. [`ingest::reader`] turns CSV or workbook bytes into a [`ingest::TabularSource`]
//! 2. [`ingest::factory`] builds one [`record::DynamicRecord`] per row
//! 3. [`ingest::classifier`] partitions the first record's columns into
//!    required and optional sets keyed by engine name
//! 4. [`mapping::MappingReconciler`] creates or updates the versioned mapping document
//! 5. [`employee::UpsertReconciler`] persists every record keyed on email + phone
//!
//! [`http::RosterServer`] exposes the upload, mapping and employee routes over hyper.
//!
//! # Example
//!
//! ```no_run
//! use roster_core::config::RosterConfig;
//! use roster_core::http::RosterServer;
//! use roster_core::store;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = RosterConfig::load()?;
//! let store = store::open_store(&config.storage)?;
//! RosterServer::new(config, store).serve().await
//! # }
//! ```

pub mod config;
pub mod employee;
pub mod error;
pub mod http;
pub mod ingest;
pub mod logging;
pub mod mapping;
pub mod record;
pub mod store;

pub use error::{Error, ProblemDetails, Result};
