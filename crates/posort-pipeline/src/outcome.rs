//! Per-document and per-archive processing records
//!
//! These are the elements of the persisted ledger. Field names (including
//! the historical `extrated_on` misspelling) match ledgers written by
//! earlier versions of the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{ArchiveStatus, DocumentStatus};

/// Record of one document extraction attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOutcome {
    #[serde(rename = "pdf")]
    pub pdf: String,

    pub status: DocumentStatus,

    #[serde(rename = "extrated_on")]
    pub extracted_on: DateTime<Utc>,
}

impl DocumentOutcome {
    pub fn new(pdf: impl Into<String>, status: DocumentStatus) -> Self {
        Self {
            pdf: pdf.into(),
            status,
            extracted_on: Utc::now(),
        }
    }
}

/// Record of one archive processing attempt. Immutable once appended to
/// the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    #[serde(rename = "zip")]
    pub zip: String,

    pub status: ArchiveStatus,

    #[serde(rename = "pdfs")]
    pub pdfs: Vec<DocumentOutcome>,
}

impl ArchiveOutcome {
    pub fn new(zip: impl Into<String>, status: ArchiveStatus, pdfs: Vec<DocumentOutcome>) -> Self {
        Self {
            zip: zip.into(),
            status,
            pdfs,
        }
    }

    /// An outcome with no document records, for archives that failed before
    /// any document work started.
    pub fn failed(zip: impl Into<String>, status: ArchiveStatus) -> Self {
        Self::new(zip, status, Vec::new())
    }
}
