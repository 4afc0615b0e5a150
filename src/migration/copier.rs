use std::time::Duration;

use anyhow::Result;
use async_channel::Sender;
use tracing::{error, info, warn};

use crate::Config;
use crate::config::ForceRetryConfig;
use crate::migration::pacer::BatchPacer;
use crate::storage::Storage;
use crate::types::MigrationStatistics;

/// Copies single objects with the configured forced retry, or only logs them in dry-run mode.
pub struct ObjectCopier {
    storage: Storage,
    force_retry_config: ForceRetryConfig,
    dry_run: bool,
    pacer: BatchPacer,
    stats_sender: Sender<MigrationStatistics>,
}

impl ObjectCopier {
    pub fn new(
        config: &Config,
        storage: Storage,
        pacer: BatchPacer,
        stats_sender: Sender<MigrationStatistics>,
    ) -> Self {
        Self {
            storage,
            force_retry_config: config.force_retry_config,
            dry_run: config.dry_run,
            pacer,
            stats_sender,
        }
    }

    /// Returns whether the object has been copied. Failures are logged here and never propagated.
    pub async fn copy(&self, key: &str) -> bool {
        if self.dry_run {
            info!(key = key, "[dry-run] object would be copied.");
            self.send_stats(MigrationStatistics::CopyComplete {
                key: key.to_string(),
            })
            .await;
            return true;
        }

        match self.copy_with_retry(key).await {
            Ok(()) => {
                info!(key = key, "object copied.");
                self.send_stats(MigrationStatistics::CopyComplete {
                    key: key.to_string(),
                })
                .await;
                true
            }
            Err(e) => {
                error!(
                    key = key,
                    error = format!("{e:?}"),
                    "failed to copy object."
                );
                self.send_stats(MigrationStatistics::CopyError {
                    key: key.to_string(),
                })
                .await;
                false
            }
        }
    }

    async fn copy_with_retry(&self, key: &str) -> Result<()> {
        let mut remaining_retries = self.force_retry_config.force_retry_count;

        loop {
            self.pacer.acquire_copy_permit().await;

            let result = self.storage.copy_object(key).await;
            if result.is_ok() || remaining_retries == 0 {
                return result;
            }

            if let Err(e) = &result {
                warn!(
                    key = key,
                    remaining_retries = remaining_retries,
                    error = format!("{e}"),
                    "copy_object() failed. retrying."
                );
            }
            remaining_retries -= 1;

            tokio::time::sleep(Duration::from_millis(
                self.force_retry_config.force_retry_interval_milliseconds,
            ))
            .await;
        }
    }

    async fn send_stats(&self, stats: MigrationStatistics) {
        let _ = self.stats_sender.send(stats).await;
    }
}
