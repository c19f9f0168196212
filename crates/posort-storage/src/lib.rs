//! Posort Storage Library
//!
//! Object-storage capability contract consumed by the processing pipeline,
//! plus the backends implementing it:
//!
//! - [`s3::S3BlobStorage`]: AWS S3 (or any S3-compatible endpoint such as
//!   minio)
//! - [`memory::MemoryBlobStorage`]: in-memory backend for local runs and
//!   tests

use async_trait::async_trait;
use posort_common::{PosortError, Result};
use regex::{Regex, RegexBuilder};

pub mod memory;
pub mod s3;

pub use memory::MemoryBlobStorage;
pub use s3::{S3BlobStorage, StorageConfig};

/// Narrow interface over an object store.
///
/// Containers are addressed per call so a single client can serve several
/// buckets. All methods are read-or-write primitives with no retry logic;
/// callers decide how failures map onto processing statuses.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// List object names under `prefix`, optionally filtered by a `*`/`?`
    /// glob pattern (matched case-insensitively against the full name).
    async fn list(&self, container: &str, prefix: &str, pattern: &str) -> Result<Vec<String>>;

    /// Fetch an object's bytes, or `None` if no such object exists.
    async fn fetch(&self, container: &str, name: &str) -> Result<Option<Vec<u8>>>;

    /// Store an object. With `overwrite = false` an already-existing object
    /// makes the call a silent no-op (first writer wins).
    async fn store(&self, container: &str, name: &str, bytes: Vec<u8>, overwrite: bool)
        -> Result<()>;
}

/// Translate a `*`/`?` glob into an anchored, case-insensitive regex.
/// An empty pattern means "match everything" and yields `None`.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Option<Regex>> {
    if pattern.trim().is_empty() {
        return Ok(None);
    }

    let escaped = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");

    let regex = RegexBuilder::new(&format!("^{escaped}$"))
        .case_insensitive(true)
        .build()
        .map_err(|e| PosortError::Config(format!("invalid list pattern '{pattern}': {e}")))?;

    Ok(Some(regex))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_matches_everything() {
        assert!(compile_pattern("").unwrap().is_none());
        assert!(compile_pattern("   ").unwrap().is_none());
    }

    #[test]
    fn star_glob_matches_suffix() {
        let re = compile_pattern("*.zip").unwrap().unwrap();
        assert!(re.is_match("orders1.zip"));
        assert!(re.is_match("incoming/orders1.zip"));
        assert!(!re.is_match("orders1.zip.bak"));
        assert!(!re.is_match("processing_metadata.json"));
    }

    #[test]
    fn glob_is_case_insensitive() {
        let re = compile_pattern("*.zip").unwrap().unwrap();
        assert!(re.is_match("ORDERS1.ZIP"));
    }

    #[test]
    fn question_mark_matches_single_character() {
        let re = compile_pattern("batch-?.zip").unwrap().unwrap();
        assert!(re.is_match("batch-1.zip"));
        assert!(!re.is_match("batch-10.zip"));
    }

    #[test]
    fn literal_dots_are_escaped() {
        let re = compile_pattern("*.zip").unwrap().unwrap();
        assert!(!re.is_match("orders1-zip"));
    }
}
