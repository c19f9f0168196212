//! Processing ledger
//!
//! The durable, append-only record of per-archive outcomes and the
//! pipeline's idempotency gate. Persisted as a bare JSON array at a fixed
//! object name; a save fully replaces the prior object.

use posort_common::{PosortError, Result};
use posort_storage::BlobStorage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::outcome::ArchiveOutcome;

/// Well-known object name of the persisted ledger.
pub const LEDGER_OBJECT: &str = "processing_metadata.json";

/// In-memory ledger, owned by the driver for the duration of one run.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    outcomes: Vec<ArchiveOutcome>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all archives with a recorded outcome, whatever the status.
    pub fn archive_names(&self) -> HashSet<&str> {
        self.outcomes.iter().map(|o| o.zip.as_str()).collect()
    }

    pub fn push(&mut self, outcome: ArchiveOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArchiveOutcome> {
        self.outcomes.iter()
    }
}

/// Loads and saves the ledger from its backing object.
pub struct LedgerStore<'a> {
    storage: &'a dyn BlobStorage,
    container: &'a str,
}

impl<'a> LedgerStore<'a> {
    pub fn new(storage: &'a dyn BlobStorage, container: &'a str) -> Self {
        Self { storage, container }
    }

    /// Load the ledger. An absent backing object yields an empty ledger; a
    /// present but undeserializable one is fatal. Silently resetting a
    /// corrupt ledger would reprocess and duplicate every prior archive.
    pub async fn load(&self) -> Result<Ledger> {
        match self.storage.fetch(self.container, LEDGER_OBJECT).await? {
            None => {
                debug!("No ledger object found, starting empty");
                Ok(Ledger::new())
            },
            Some(bytes) => {
                let ledger: Ledger =
                    serde_json::from_slice(&bytes).map_err(|e| PosortError::LedgerCorrupt {
                        object: LEDGER_OBJECT.to_string(),
                        reason: e.to_string(),
                    })?;
                info!(archives = ledger.len(), "Loaded processing ledger");
                Ok(ledger)
            },
        }
    }

    /// Serialize and store the ledger, replacing the prior object.
    pub async fn save(&self, ledger: &Ledger) -> Result<()> {
        let bytes = serde_json::to_vec(ledger)?;

        self.storage
            .store(self.container, LEDGER_OBJECT, bytes, true)
            .await?;

        info!(archives = ledger.len(), "Saved processing ledger");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ArchiveOutcome;
    use crate::status::ArchiveStatus;
    use posort_storage::MemoryBlobStorage;

    #[tokio::test]
    async fn load_returns_empty_ledger_when_object_absent() {
        let storage = MemoryBlobStorage::new();
        let store = LedgerStore::new(&storage, "bucket");

        let ledger = store.load().await.unwrap();
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn load_fails_on_corrupt_object_instead_of_resetting() {
        let storage = MemoryBlobStorage::new();
        storage.insert("bucket", LEDGER_OBJECT, b"{not json".to_vec());
        let store = LedgerStore::new(&storage, "bucket");

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, PosortError::LedgerCorrupt { .. }));
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let storage = MemoryBlobStorage::new();
        let store = LedgerStore::new(&storage, "bucket");

        let mut ledger = Ledger::new();
        ledger.push(ArchiveOutcome::failed("a.zip", ArchiveStatus::CsvNotFound));
        ledger.push(ArchiveOutcome::failed(
            "b.zip",
            ArchiveStatus::UnableToReadZip,
        ));
        store.save(&ledger).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            loaded.archive_names(),
            ["a.zip", "b.zip"].into_iter().collect()
        );
    }

    #[tokio::test]
    async fn persisted_form_is_a_bare_json_array() {
        let storage = MemoryBlobStorage::new();
        let store = LedgerStore::new(&storage, "bucket");

        let mut ledger = Ledger::new();
        ledger.push(ArchiveOutcome::failed("a.zip", ArchiveStatus::Error));
        store.save(&ledger).await.unwrap();

        let bytes = storage.get("bucket", LEDGER_OBJECT).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["zip"], "a.zip");
        assert_eq!(value[0]["status"], "Error");
    }

    #[tokio::test]
    async fn save_replaces_prior_object() {
        let storage = MemoryBlobStorage::new();
        let store = LedgerStore::new(&storage, "bucket");

        let mut ledger = Ledger::new();
        ledger.push(ArchiveOutcome::failed("a.zip", ArchiveStatus::Error));
        store.save(&ledger).await.unwrap();

        ledger.push(ArchiveOutcome::failed("b.zip", ArchiveStatus::Error));
        store.save(&ledger).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
    }
}
