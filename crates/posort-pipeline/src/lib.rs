//! Posort Pipeline Library
//!
//! The core processing pipeline: discover unprocessed ZIP archives in an
//! object store, parse the `~`-delimited CSV manifest bundled inside each
//! archive, extract the referenced PDF documents with bounded parallelism,
//! relocate them under `by-po/<po-number>/`, and record a per-archive
//! outcome in a durable JSON ledger that makes reruns idempotent.
//!
//! # Example
//!
//! ```no_run
//! use posort_pipeline::{config::AppConfig, driver::PipelineDriver};
//! use posort_storage::MemoryBlobStorage;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> posort_common::Result<()> {
//!     let storage = Arc::new(MemoryBlobStorage::new());
//!     let config = AppConfig::new("uploads", "_");
//!     let driver = PipelineDriver::new(storage, config);
//!     driver.run(&CancellationToken::new()).await
//! }
//! ```

pub mod archive;
pub mod config;
pub mod driver;
pub mod ledger;
pub mod manifest;
pub mod outcome;
pub mod processor;
pub mod relocate;
pub mod status;
