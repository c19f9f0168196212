//! Posort Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging setup for the posort workspace.
//!
//! # Overview
//!
//! This crate provides the functionality used across all posort workspace
//! members:
//!
//! - **Error Handling**: the [`PosortError`] type and [`Result`] alias
//! - **Logging**: `tracing` subscriber configuration and initialization

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{PosortError, Result};
