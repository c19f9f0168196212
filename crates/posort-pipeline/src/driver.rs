//! Pipeline driver
//!
//! Runs one pass over the container: load the ledger, list candidate
//! archives, process the ones without a recorded outcome, persist the
//! updated ledger. Archives are processed sequentially; parallelism lives
//! inside the archive processor.

use posort_common::{PosortError, Result};
use posort_storage::BlobStorage;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::ledger::LedgerStore;
use crate::processor::ArchiveProcessor;

/// Glob selecting candidate archives in the container.
pub const ARCHIVE_PATTERN: &str = "*.zip";

/// Owns the ledger for the duration of one run.
pub struct PipelineDriver {
    storage: Arc<dyn BlobStorage>,
    config: AppConfig,
}

impl PipelineDriver {
    pub fn new(storage: Arc<dyn BlobStorage>, config: AppConfig) -> Self {
        Self { storage, config }
    }

    /// Process all new archives. The elapsed-time summary is logged on
    /// every exit path, success or failure.
    pub async fn run(&self, token: &CancellationToken) -> Result<()> {
        let started = Instant::now();

        let result = self.process_new_archives(token).await;

        info!(
            elapsed = %format_elapsed(started.elapsed()),
            "Total process time"
        );

        result
    }

    async fn process_new_archives(&self, token: &CancellationToken) -> Result<()> {
        let ledger_store = LedgerStore::new(self.storage.as_ref(), &self.config.container);
        let mut ledger = ledger_store.load().await?;

        let processed: HashSet<String> = ledger
            .archive_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let archives = self
            .storage
            .list(&self.config.container, "", ARCHIVE_PATTERN)
            .await?;

        info!(
            listed = archives.len(),
            already_processed = processed.len(),
            "Listed candidate archives"
        );

        let processor = ArchiveProcessor::new(self.storage.as_ref(), &self.config);
        let mut appended = false;

        for zip_name in archives {
            if processed.contains(&zip_name) {
                debug!(zip = %zip_name, "Already processed, skipping");
                continue;
            }

            if token.is_cancelled() {
                return Err(PosortError::Cancelled);
            }

            let outcome = processor.process(&zip_name, token).await?;
            ledger.push(outcome);
            appended = true;
        }

        // Nothing new means nothing to persist; a rerun over an unchanged
        // container performs zero writes.
        if appended {
            ledger_store.save(&ledger).await?;
        }

        Ok(())
    }
}

/// Format a duration as `HH:MM:SS.cc`.
fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    let hours = millis / 3_600_000;
    let minutes = millis / 60_000 % 60;
    let seconds = millis / 1_000 % 60;
    let centis = millis % 1_000 / 10;

    format!("{hours:02}:{minutes:02}:{seconds:02}.{centis:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_elapsed_time() {
        assert_eq!(format_elapsed(Duration::from_millis(0)), "00:00:00.00");
        assert_eq!(format_elapsed(Duration::from_millis(1_234)), "00:00:01.23");
        assert_eq!(
            format_elapsed(Duration::from_secs(2 * 3600 + 3 * 60 + 4)),
            "02:03:04.00"
        );
    }
}
