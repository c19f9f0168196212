//! Relocation writer
//!
//! Delivers an extracted document to its PO-partitioned destination.
//! Destinations are never overwritten: redelivery of an already-placed
//! document is a silent no-op, which keeps reruns idempotent.

use posort_common::Result;
use posort_storage::BlobStorage;
use tracing::debug;

/// Destination prefix for relocated documents.
pub const DESTINATION_PREFIX: &str = "by-po";

/// Destination key for a document, `by-po/<po>/<filename>`.
pub fn destination_key(po_number: &str, filename: &str) -> String {
    format!("{DESTINATION_PREFIX}/{po_number}/{filename}")
}

/// Write a document's bytes under its resolved PO number. An existing
/// object at the destination is left untouched; any other storage failure
/// propagates.
pub async fn deliver(
    storage: &dyn BlobStorage,
    container: &str,
    po_number: &str,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<()> {
    let key = destination_key(po_number, filename);

    debug!(container, key = %key, "Delivering document");

    storage.store(container, &key, bytes, false).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use posort_storage::MemoryBlobStorage;

    #[test]
    fn destination_key_is_po_partitioned() {
        assert_eq!(destination_key("PO100", "a.pdf"), "by-po/PO100/a.pdf");
        assert_eq!(destination_key("_", "b.pdf"), "by-po/_/b.pdf");
    }

    #[tokio::test]
    async fn deliver_writes_to_destination() {
        let storage = MemoryBlobStorage::new();

        deliver(&storage, "bucket", "PO100", "a.pdf", b"pdf".to_vec())
            .await
            .unwrap();

        assert_eq!(
            storage.get("bucket", "by-po/PO100/a.pdf"),
            Some(b"pdf".to_vec())
        );
    }

    #[tokio::test]
    async fn deliver_never_overwrites_existing_destination() {
        let storage = MemoryBlobStorage::new();
        storage.insert("bucket", "by-po/PO100/a.pdf", b"first".to_vec());

        deliver(&storage, "bucket", "PO100", "a.pdf", b"second".to_vec())
            .await
            .unwrap();

        assert_eq!(
            storage.get("bucket", "by-po/PO100/a.pdf"),
            Some(b"first".to_vec())
        );
    }
}
