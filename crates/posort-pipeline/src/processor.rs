//! Archive processor
//!
//! Processes exactly one archive end-to-end: fetch, locate and parse the
//! manifest, extract and relocate every referenced document with bounded
//! parallelism, and derive the archive's aggregate status.

use futures::{stream, StreamExt};
use posort_common::{PosortError, Result};
use posort_storage::BlobStorage;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::archive::DocumentArchive;
use crate::config::AppConfig;
use crate::manifest::{parse_manifest, Attachment};
use crate::outcome::{ArchiveOutcome, DocumentOutcome};
use crate::relocate;
use crate::status::{ArchiveStatus, DocumentStatus};

/// Hard cap on concurrent document operations within one archive.
pub const MAX_IN_FLIGHT_DOCUMENTS: usize = 10;

/// Processes one archive at a time against a storage backend.
pub struct ArchiveProcessor<'a> {
    storage: &'a dyn BlobStorage,
    config: &'a AppConfig,
}

impl<'a> ArchiveProcessor<'a> {
    pub fn new(storage: &'a dyn BlobStorage, config: &'a AppConfig) -> Self {
        Self { storage, config }
    }

    /// Process one archive and produce its outcome.
    ///
    /// Every per-document and per-archive failure is converted into a
    /// status code; the only error this returns is the cancellation
    /// signal.
    pub async fn process(
        &self,
        zip_name: &str,
        token: &CancellationToken,
    ) -> Result<ArchiveOutcome> {
        info!(zip = %zip_name, "Start processing ZIP");

        let bytes = match self.storage.fetch(&self.config.container, zip_name).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!(zip = %zip_name, "Unable to read ZIP: object absent");
                return Ok(ArchiveOutcome::failed(
                    zip_name,
                    ArchiveStatus::UnableToReadZip,
                ));
            },
            Err(err) => {
                warn!(zip = %zip_name, error = %err, "Unable to read ZIP");
                return Ok(ArchiveOutcome::failed(
                    zip_name,
                    ArchiveStatus::UnableToReadZip,
                ));
            },
        };

        let archive = match DocumentArchive::open(bytes) {
            Ok(archive) => archive,
            Err(err) => {
                warn!(zip = %zip_name, error = %err, "Unable to open ZIP");
                return Ok(ArchiveOutcome::failed(
                    zip_name,
                    ArchiveStatus::UnableToReadZip,
                ));
            },
        };

        info!(zip = %zip_name, "Start reading CSV");

        // A missing manifest and an unparseable one report the same status;
        // the distinction only shows up in the logs.
        let entries = match self.read_manifest(zip_name, &archive) {
            Some(entries) => entries,
            None => {
                return Ok(ArchiveOutcome::failed(zip_name, ArchiveStatus::CsvNotFound));
            },
        };

        info!(zip = %zip_name, "End reading CSV");

        let documents: Vec<(String, Attachment)> = entries
            .into_iter()
            .flat_map(|entry| {
                let po_number = entry.po_number;
                entry
                    .attachments
                    .into_iter()
                    .map(move |attachment| (po_number.clone(), attachment))
            })
            .collect();

        info!(zip = %zip_name, documents = documents.len(), "Start processing PDFs");

        // `buffered` bounds concurrency and yields results in input order,
        // so ledger entries are stable across reruns.
        let results: Vec<Result<DocumentOutcome>> = stream::iter(
            documents
                .iter()
                .map(|(po_number, attachment)| {
                    self.process_document(zip_name, &archive, po_number, attachment, token)
                }),
        )
        .buffered(MAX_IN_FLIGHT_DOCUMENTS)
        .collect()
        .await;

        let pdfs = results.into_iter().collect::<Result<Vec<_>>>()?;

        info!(zip = %zip_name, "End processing PDFs");

        let status = aggregate_status(&pdfs);
        let outcome = ArchiveOutcome::new(zip_name, status, pdfs);

        info!(zip = %zip_name, status = %outcome.status, "End processing ZIP");

        Ok(outcome)
    }

    fn read_manifest(
        &self,
        zip_name: &str,
        archive: &DocumentArchive,
    ) -> Option<Vec<crate::manifest::ManifestEntry>> {
        let name = match archive.manifest_name() {
            Some(name) => name,
            None => {
                warn!(zip = %zip_name, "CSV not found");
                return None;
            },
        };

        let bytes = match archive.read_entry(&name) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(zip = %zip_name, csv = %name, error = %err, "Failed to read CSV entry");
                return None;
            },
        };

        match parse_manifest(&bytes) {
            Ok(entries) => Some(entries),
            Err(err) => {
                warn!(zip = %zip_name, csv = %name, error = %err, "Failed to parse CSV");
                None
            },
        }
    }

    async fn process_document(
        &self,
        zip_name: &str,
        archive: &DocumentArchive,
        po_number: &str,
        attachment: &Attachment,
        token: &CancellationToken,
    ) -> Result<DocumentOutcome> {
        if token.is_cancelled() {
            return Err(PosortError::Cancelled);
        }

        let filename = attachment.filename.as_str();

        info!(zip = %zip_name, pdf = %filename, "Start processing PDF");

        let bytes = match archive.read_document(filename) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!(zip = %zip_name, pdf = %filename, "PDF not found");
                return Ok(DocumentOutcome::new(filename, DocumentStatus::PdfNotFound));
            },
            Err(err) => {
                error!(zip = %zip_name, pdf = %filename, error = %err, "Error extracting PDF");
                return Ok(DocumentOutcome::new(filename, DocumentStatus::Error));
            },
        };

        let po_number = if po_number.trim().is_empty() {
            self.config.unknown_po_folder.as_str()
        } else {
            po_number
        };

        let status = match relocate::deliver(
            self.storage,
            &self.config.container,
            po_number,
            filename,
            bytes,
        )
        .await
        {
            Ok(()) => {
                if po_number == self.config.unknown_po_folder {
                    DocumentStatus::UnknownPoNumber
                } else {
                    DocumentStatus::Success
                }
            },
            Err(err) => {
                error!(zip = %zip_name, pdf = %filename, error = %err, "Error processing PDF");
                DocumentStatus::Error
            },
        };

        info!(zip = %zip_name, pdf = %filename, status = %status, "End processing PDF");

        Ok(DocumentOutcome::new(filename, status))
    }
}

/// Derive the archive status from its document outcomes.
///
/// With S successes out of N documents: S = 0 (including N = 0) is
/// `Error`, 0 < S < N is `Partial`, S = N is `Success`. Any non-`Success`
/// document, including `Partial:UnknownPONumber`, lowers S.
fn aggregate_status(pdfs: &[DocumentOutcome]) -> ArchiveStatus {
    let total = pdfs.len();
    let successes = pdfs
        .iter()
        .filter(|pdf| pdf.status == DocumentStatus::Success)
        .count();

    if successes == 0 {
        ArchiveStatus::Error
    } else if successes < total {
        ArchiveStatus::Partial
    } else {
        ArchiveStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: DocumentStatus) -> DocumentOutcome {
        DocumentOutcome::new("a.pdf", status)
    }

    #[test]
    fn no_documents_aggregates_to_error() {
        assert_eq!(aggregate_status(&[]), ArchiveStatus::Error);
    }

    #[test]
    fn no_successes_aggregates_to_error() {
        let pdfs = vec![
            outcome(DocumentStatus::PdfNotFound),
            outcome(DocumentStatus::Error),
        ];
        assert_eq!(aggregate_status(&pdfs), ArchiveStatus::Error);
    }

    #[test]
    fn mixed_results_aggregate_to_partial() {
        let pdfs = vec![
            outcome(DocumentStatus::Success),
            outcome(DocumentStatus::PdfNotFound),
        ];
        assert_eq!(aggregate_status(&pdfs), ArchiveStatus::Partial);
    }

    #[test]
    fn unknown_po_counts_against_success() {
        let pdfs = vec![
            outcome(DocumentStatus::Success),
            outcome(DocumentStatus::UnknownPoNumber),
        ];
        assert_eq!(aggregate_status(&pdfs), ArchiveStatus::Partial);

        let only_unknown = vec![outcome(DocumentStatus::UnknownPoNumber)];
        assert_eq!(aggregate_status(&only_unknown), ArchiveStatus::Error);
    }

    #[test]
    fn all_successes_aggregate_to_success() {
        let pdfs = vec![
            outcome(DocumentStatus::Success),
            outcome(DocumentStatus::Success),
        ];
        assert_eq!(aggregate_status(&pdfs), ArchiveStatus::Success);
    }
}
