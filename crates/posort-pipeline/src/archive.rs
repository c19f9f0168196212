//! ZIP archive access
//!
//! Wraps an in-memory ZIP so the bounded document workers can share one
//! open archive. Entry reads are short and synchronous, so a plain mutex
//! is enough; the concurrency win is in the storage writes.

use posort_common::{PosortError, Result};
use std::io::{Cursor, Read};
use std::sync::{Mutex, MutexGuard, PoisonError};
use zip::ZipArchive;

/// File extension identifying the manifest entry inside an archive.
pub const MANIFEST_EXTENSION: &str = ".csv";

/// A read-only ZIP archive shared across document workers.
#[derive(Debug)]
pub struct DocumentArchive {
    inner: Mutex<ZipArchive<Cursor<Vec<u8>>>>,
}

impl DocumentArchive {
    /// Open an archive from its raw bytes.
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| PosortError::Archive(format!("failed to open zip: {e}")))?;

        Ok(Self {
            inner: Mutex::new(archive),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ZipArchive<Cursor<Vec<u8>>>> {
        // Entry reads never panic while holding the lock; recover anyway.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Name of the first entry ending in [`MANIFEST_EXTENSION`], if any.
    ///
    /// Scans entries in archive order; `file_names()` iterates a hash map
    /// and would make "first" nondeterministic.
    pub fn manifest_name(&self) -> Option<String> {
        let mut archive = self.lock();
        for index in 0..archive.len() {
            if let Ok(entry) = archive.by_index_raw(index) {
                if entry.name().ends_with(MANIFEST_EXTENSION) {
                    return Some(entry.name().to_string());
                }
            }
        }
        None
    }

    /// Read an entry's bytes by exact name.
    pub fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        let mut archive = self.lock();

        let mut entry = archive
            .by_name(name)
            .map_err(|e| PosortError::Archive(format!("failed to open entry '{name}': {e}")))?;

        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;

        Ok(bytes)
    }

    /// Read a document's bytes, matching `filename` case-insensitively
    /// against full entry names. Returns `Ok(None)` when absent.
    pub fn read_document(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        let matched = self
            .lock()
            .file_names()
            .find(|name| name.eq_ignore_ascii_case(filename))
            .map(str::to_string);

        match matched {
            Some(name) => self.read_entry(&name).map(Some),
            None => Ok(None),
        }
    }
}
