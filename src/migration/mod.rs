use async_channel::Sender;
use tracing::{error, info, warn};

use crate::Config;
use crate::migration::copier::ObjectCopier;
use crate::migration::lister::list_all_keys;
use crate::migration::pacer::BatchPacer;
use crate::migration::prefix::{build_listing_prefix, derive_prefix};
use crate::storage::Storage;
use crate::types::error::S3migrateError;
use crate::types::token::MigrationCancellationToken;
use crate::types::{MigrationReport, MigrationStatistics};

pub mod copier;
pub mod lister;
pub mod pacer;
pub mod prefix;

/// Copies the objects of every identifier, batch by batch.
///
/// Identifiers are processed one at a time in the given order. A listing or copy failure only
/// affects its own identifier or object. Between two batches the pacer pauses, and the
/// cancellation token is honored between identifiers and during that pause.
pub struct BatchCopier {
    storage: Storage,
    category_prefix: String,
    batch_size: usize,
    max_keys: i32,
    object_copier: ObjectCopier,
    pacer: BatchPacer,
    cancellation_token: MigrationCancellationToken,
    stats_sender: Sender<MigrationStatistics>,
}

impl BatchCopier {
    pub fn new(
        config: &Config,
        table_name: &str,
        storage: Storage,
        cancellation_token: MigrationCancellationToken,
        stats_sender: Sender<MigrationStatistics>,
    ) -> Self {
        let pacer = BatchPacer::new(config, cancellation_token.clone());
        let object_copier = ObjectCopier::new(
            config,
            dyn_clone::clone_box(&*storage),
            pacer.clone(),
            stats_sender.clone(),
        );

        Self {
            storage,
            category_prefix: derive_prefix(table_name),
            batch_size: config.batch_config.batch_size.max(1),
            max_keys: config.max_keys,
            object_copier,
            pacer,
            cancellation_token,
            stats_sender,
        }
    }

    #[cfg(test)]
    fn category_prefix(&self) -> &str {
        &self.category_prefix
    }

    pub async fn run(&self, identifiers: &[String]) -> MigrationReport {
        let mut report = MigrationReport {
            total_identifiers: identifiers.len(),
            ..Default::default()
        };

        if identifiers.is_empty() {
            info!("no identifiers to process.");
            return report;
        }

        let batch_count = identifiers.len().div_ceil(self.batch_size);
        info!(
            category_prefix = self.category_prefix,
            identifier_count = identifiers.len(),
            batch_count = batch_count,
            batch_size = self.batch_size,
            "migration started."
        );

        for (batch_index, batch) in identifiers.chunks(self.batch_size).enumerate() {
            let batch_number = batch_index + 1;
            info!(
                batch_number = batch_number,
                batch_count = batch_count,
                first_identifier = batch.first().map(String::as_str),
                last_identifier = batch.last().map(String::as_str),
                "processing batch."
            );

            for identifier in batch {
                if self.cancellation_token.is_cancelled() {
                    warn!(identifier = identifier, "migration cancelled.");
                    report.cancelled = true;
                    return report;
                }

                self.migrate_identifier(identifier, &mut report).await;
                if report.cancelled {
                    warn!(identifier = identifier, "migration cancelled.");
                    return report;
                }
            }

            report.batches_processed += 1;
            self.send_stats(MigrationStatistics::BatchComplete { batch_number })
                .await;

            if batch_number < batch_count && !self.pacer.pause_between_batches().await {
                warn!(batch_number = batch_number, "migration cancelled.");
                report.cancelled = true;
                return report;
            }
        }

        report
    }

    async fn migrate_identifier(&self, identifier: &str, report: &mut MigrationReport) {
        let prefix = build_listing_prefix(&self.category_prefix, identifier);

        let keys =
            match list_all_keys(&self.storage, &prefix, self.max_keys, &self.cancellation_token)
                .await
            {
                Ok(keys) => keys,
                Err(e) => {
                    if let Some(S3migrateError::Cancelled) = e.downcast_ref::<S3migrateError>() {
                        report.cancelled = true;
                        return;
                    }

                    error!(
                        identifier = identifier,
                        prefix = prefix,
                        error = format!("{e:?}"),
                        "failed to list objects."
                    );
                    report.identifiers_processed += 1;
                    report.identifiers_with_list_error += 1;
                    self.send_stats(MigrationStatistics::IdentifierError {
                        identifier: identifier.to_string(),
                    })
                    .await;
                    return;
                }
            };

        report.identifiers_processed += 1;

        if keys.is_empty() {
            info!(
                identifier = identifier,
                prefix = prefix,
                "no objects found."
            );
            report.identifiers_without_objects += 1;
            self.send_stats(MigrationStatistics::IdentifierEmpty {
                identifier: identifier.to_string(),
            })
            .await;
            return;
        }

        for key in &keys {
            if self.object_copier.copy(key).await {
                report.objects_copied += 1;
            } else {
                report.objects_failed += 1;
            }
        }
    }

    async fn send_stats(&self, stats: MigrationStatistics) {
        let _ = self.stats_sender.send(stats).await;
    }
}
