//! CSV manifest parsing
//!
//! Each archive carries a `~`-delimited CSV with a header row. Two columns
//! matter: `PO Number` and `Attachment List`, the latter a comma-separated
//! list of relative-path/filename pairs.

use posort_common::{PosortError, Result};
use std::path::Path;

const PO_NUMBER_COLUMN: &str = "PO Number";
const ATTACHMENT_LIST_COLUMN: &str = "Attachment List";

/// One document reference from an attachment-list cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Directory portion of the reference, possibly empty.
    pub path: String,
    /// Final path component; this is what gets matched against archive
    /// entry names and used in the destination key.
    pub filename: String,
}

/// One manifest row: a PO number (possibly blank) and its attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub po_number: String,
    pub attachments: Vec<Attachment>,
}

/// Parse a manifest file's bytes into entries, preserving row order.
///
/// Fields are trimmed and blank lines skipped. A missing required column
/// or a malformed row is a [`PosortError::ManifestParse`], which the
/// archive processor reports as an unreadable manifest.
pub fn parse_manifest(bytes: &[u8]) -> Result<Vec<ManifestEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'~')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| PosortError::ManifestParse(e.to_string()))?
        .clone();

    let po_idx = column_index(&headers, PO_NUMBER_COLUMN)?;
    let attachments_idx = column_index(&headers, ATTACHMENT_LIST_COLUMN)?;

    let mut entries = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| PosortError::ManifestParse(e.to_string()))?;

        entries.push(ManifestEntry {
            po_number: record.get(po_idx).unwrap_or_default().to_string(),
            attachments: parse_attachment_list(record.get(attachments_idx).unwrap_or_default()),
        });
    }

    Ok(entries)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| PosortError::ManifestParse(format!("missing required column '{name}'")))
}

/// Split an attachment-list cell on `,`, dropping blank segments, and
/// split each segment into its directory and filename portions.
fn parse_attachment_list(cell: &str) -> Vec<Attachment> {
    cell.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let reference = Path::new(segment);
            Attachment {
                path: reference
                    .parent()
                    .map(|d| d.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                filename: reference
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_else(|| segment.to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_in_order() {
        let csv = b"PO Number~Attachment List\nPO100~inv/a.pdf\nPO200~inv/b.pdf";
        let entries = parse_manifest(csv).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].po_number, "PO100");
        assert_eq!(entries[1].po_number, "PO200");
        assert_eq!(
            entries[0].attachments,
            vec![Attachment {
                path: "inv".to_string(),
                filename: "a.pdf".to_string()
            }]
        );
    }

    #[test]
    fn splits_attachment_list_and_drops_blank_segments() {
        let csv = b"PO Number~Attachment List\nPO100~inv/a.pdf,,b.pdf, ,scans/deep/c.pdf";
        let entries = parse_manifest(csv).unwrap();

        let attachments = &entries[0].attachments;
        assert_eq!(attachments.len(), 3);
        assert_eq!(attachments[0].filename, "a.pdf");
        assert_eq!(attachments[1].path, "");
        assert_eq!(attachments[1].filename, "b.pdf");
        assert_eq!(attachments[2].path, "scans/deep");
        assert_eq!(attachments[2].filename, "c.pdf");
    }

    #[test]
    fn trims_fields() {
        let csv = b"PO Number~Attachment List\n  PO100  ~  a.pdf  ";
        let entries = parse_manifest(csv).unwrap();

        assert_eq!(entries[0].po_number, "PO100");
        assert_eq!(entries[0].attachments[0].filename, "a.pdf");
    }

    #[test]
    fn blank_po_number_is_preserved_as_empty() {
        let csv = b"PO Number~Attachment List\n~a.pdf";
        let entries = parse_manifest(csv).unwrap();

        assert_eq!(entries[0].po_number, "");
        assert_eq!(entries[0].attachments.len(), 1);
    }

    #[test]
    fn empty_attachment_list_yields_no_attachments() {
        let csv = b"PO Number~Attachment List\nPO100~";
        let entries = parse_manifest(csv).unwrap();

        assert!(entries[0].attachments.is_empty());
    }

    #[test]
    fn missing_required_column_is_a_parse_error() {
        let csv = b"Order~Files\nPO100~a.pdf";
        let err = parse_manifest(csv).unwrap_err();

        assert!(matches!(err, PosortError::ManifestParse(_)));
        assert!(err.to_string().contains("PO Number"));
    }

    #[test]
    fn ragged_row_is_a_parse_error() {
        let csv = b"PO Number~Attachment List\nPO100~a.pdf~extra";
        let err = parse_manifest(csv).unwrap_err();

        assert!(matches!(err, PosortError::ManifestParse(_)));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let csv = b"Vendor~PO Number~Attachment List\nAcme~PO100~a.pdf";
        let entries = parse_manifest(csv).unwrap();

        assert_eq!(entries[0].po_number, "PO100");
        assert_eq!(entries[0].attachments[0].filename, "a.pdf");
    }
}
