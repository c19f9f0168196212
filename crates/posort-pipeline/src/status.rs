//! Processing status codes
//!
//! The serialized string values are a compatibility contract with ledgers
//! written by earlier versions of the system; do not change them.

use serde::{Deserialize, Serialize};

/// Outcome of processing a single PDF document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    /// Extracted and delivered under a real PO number.
    Success,

    /// Delivered, but under the fallback folder because the manifest row
    /// carried no PO number.
    #[serde(rename = "Partial:UnknownPONumber")]
    UnknownPoNumber,

    /// Referenced by the manifest but absent from the archive.
    #[serde(rename = "Error:PdfNotFound")]
    PdfNotFound,

    /// Extraction or delivery failed.
    Error,
}

impl DocumentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Success => "Success",
            DocumentStatus::UnknownPoNumber => "Partial:UnknownPONumber",
            DocumentStatus::PdfNotFound => "Error:PdfNotFound",
            DocumentStatus::Error => "Error",
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of processing a whole archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveStatus {
    /// Every referenced document succeeded.
    Success,

    /// Some, but not all, referenced documents succeeded.
    Partial,

    /// No referenced document succeeded (including the zero-document case).
    Error,

    /// The archive object could not be fetched or opened.
    #[serde(rename = "Error:UnableToReadZip")]
    UnableToReadZip,

    /// No CSV manifest was found in the archive, or it failed to parse.
    #[serde(rename = "Error:CsvNotFound")]
    CsvNotFound,
}

impl ArchiveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ArchiveStatus::Success => "Success",
            ArchiveStatus::Partial => "Partial",
            ArchiveStatus::Error => "Error",
            ArchiveStatus::UnableToReadZip => "Error:UnableToReadZip",
            ArchiveStatus::CsvNotFound => "Error:CsvNotFound",
        }
    }
}

impl std::fmt::Display for ArchiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_status_serializes_to_legacy_strings() {
        let cases = [
            (DocumentStatus::Success, "\"Success\""),
            (
                DocumentStatus::UnknownPoNumber,
                "\"Partial:UnknownPONumber\"",
            ),
            (DocumentStatus::PdfNotFound, "\"Error:PdfNotFound\""),
            (DocumentStatus::Error, "\"Error\""),
        ];

        for (status, expected) in cases {
            assert_eq!(serde_json::to_string(&status).unwrap(), expected);
            let parsed: DocumentStatus = serde_json::from_str(expected).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn archive_status_serializes_to_legacy_strings() {
        let cases = [
            (ArchiveStatus::Success, "\"Success\""),
            (ArchiveStatus::Partial, "\"Partial\""),
            (ArchiveStatus::Error, "\"Error\""),
            (ArchiveStatus::UnableToReadZip, "\"Error:UnableToReadZip\""),
            (ArchiveStatus::CsvNotFound, "\"Error:CsvNotFound\""),
        ];

        for (status, expected) in cases {
            assert_eq!(serde_json::to_string(&status).unwrap(), expected);
            let parsed: ArchiveStatus = serde_json::from_str(expected).unwrap();
            assert_eq!(parsed, status);
        }
    }
}
