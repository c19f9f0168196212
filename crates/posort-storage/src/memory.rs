//! In-memory storage backend
//!
//! Backs local runs and tests without touching a real object store.
//! Listing order is lexicographic by object name, matching S3 semantics.

use async_trait::async_trait;
use posort_common::Result;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use crate::{compile_pattern, BlobStorage};

/// In-memory implementation of [`BlobStorage`].
#[derive(Debug, Default)]
pub struct MemoryBlobStorage {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<(String, String), Vec<u8>>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an object directly, without counting it as a pipeline write.
    pub fn insert(&self, container: &str, name: &str, bytes: Vec<u8>) {
        self.lock()
            .insert((container.to_string(), name.to_string()), bytes);
    }

    /// Read an object's bytes, if present.
    pub fn get(&self, container: &str, name: &str) -> Option<Vec<u8>> {
        self.lock()
            .get(&(container.to_string(), name.to_string()))
            .cloned()
    }

    pub fn contains(&self, container: &str, name: &str) -> bool {
        self.lock()
            .contains_key(&(container.to_string(), name.to_string()))
    }

    /// Number of writes performed through [`BlobStorage::store`]. No-op
    /// stores (overwrite refused) are not counted.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn list(&self, container: &str, prefix: &str, pattern: &str) -> Result<Vec<String>> {
        let matcher = compile_pattern(pattern)?;

        let names = self
            .lock()
            .iter()
            .filter(|((c, name), _)| {
                c.as_str() == container
                    && name.starts_with(prefix)
                    && matcher.as_ref().is_none_or(|re| re.is_match(name))
            })
            .map(|((_, name), _)| name.clone())
            .collect();

        Ok(names)
    }

    async fn fetch(&self, container: &str, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.get(container, name))
    }

    async fn store(
        &self,
        container: &str,
        name: &str,
        bytes: Vec<u8>,
        overwrite: bool,
    ) -> Result<()> {
        let mut objects = self.lock();
        let key = (container.to_string(), name.to_string());

        if !overwrite && objects.contains_key(&key) {
            debug!("{}/{} already exists, skipping", container, name);
            return Ok(());
        }

        objects.insert(key, bytes);
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_then_fetch_round_trips() {
        let storage = MemoryBlobStorage::new();
        storage
            .store("bucket", "a.txt", b"hello".to_vec(), true)
            .await
            .unwrap();

        assert_eq!(
            storage.fetch("bucket", "a.txt").await.unwrap(),
            Some(b"hello".to_vec())
        );
        assert_eq!(storage.fetch("bucket", "missing.txt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_without_overwrite_is_a_noop_on_existing_object() {
        let storage = MemoryBlobStorage::new();
        storage.insert("bucket", "a.txt", b"original".to_vec());

        storage
            .store("bucket", "a.txt", b"replacement".to_vec(), false)
            .await
            .unwrap();

        assert_eq!(storage.get("bucket", "a.txt"), Some(b"original".to_vec()));
        assert_eq!(storage.write_count(), 0);
    }

    #[tokio::test]
    async fn store_with_overwrite_replaces_existing_object() {
        let storage = MemoryBlobStorage::new();
        storage.insert("bucket", "a.txt", b"original".to_vec());

        storage
            .store("bucket", "a.txt", b"replacement".to_vec(), true)
            .await
            .unwrap();

        assert_eq!(
            storage.get("bucket", "a.txt"),
            Some(b"replacement".to_vec())
        );
        assert_eq!(storage.write_count(), 1);
    }

    #[tokio::test]
    async fn list_filters_by_container_prefix_and_pattern() {
        let storage = MemoryBlobStorage::new();
        storage.insert("bucket", "orders1.zip", vec![]);
        storage.insert("bucket", "orders2.zip", vec![]);
        storage.insert("bucket", "processing_metadata.json", vec![]);
        storage.insert("other", "orders3.zip", vec![]);

        let names = storage.list("bucket", "", "*.zip").await.unwrap();
        assert_eq!(names, vec!["orders1.zip", "orders2.zip"]);

        let all = storage.list("bucket", "", "").await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
