use std::io;

use anyhow::{Result, anyhow};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use s3migrate::Config;
use s3migrate::identifier::fetch_identifiers_or_empty;
use s3migrate::migration::BatchCopier;
use s3migrate::storage::s3::S3StorageFactory;
use s3migrate::types::token::{MigrationCancellationToken, create_migration_cancellation_token};
use s3migrate::types::{MIGRATION_SUMMARY_NAME, MigrationReport};

mod indicator;
mod prompt;
mod ui_config;

#[allow(dead_code)]
const EXIT_CODE_SUCCESS: i32 = 0;
#[allow(dead_code)]
const EXIT_CODE_ERROR: i32 = 1;
#[allow(dead_code)]
const EXIT_CODE_INVALID_ARGS: i32 = 2;
const EXIT_CODE_WARNING: i32 = 3;

pub async fn run(config: Config) -> Result<()> {
    let report = {
        let request = prompt::resolve_migration_request(
            &config,
            &mut io::stdin().lock(),
            &mut io::stdout(),
        )?;

        let cancellation_token = create_migration_cancellation_token();
        spawn_ctrl_c_handler(cancellation_token.clone());

        let start_time = Instant::now();
        trace!("migration start.");

        let identifiers = fetch_identifiers_or_empty(request.identifier_source.as_ref()).await;

        let (stats_sender, stats_receiver) = async_channel::unbounded();
        let indicator_join_handle = indicator::show_indicator(
            stats_receiver,
            ui_config::is_progress_indicator_needed(&config),
            ui_config::is_show_result_needed(&config),
            config.dry_run,
        );

        let storage = S3StorageFactory::create(&config).await;
        let batch_copier = BatchCopier::new(
            &config,
            &request.table_name,
            storage,
            cancellation_token.clone(),
            stats_sender.clone(),
        );

        let report = batch_copier.run(&identifiers).await;
        stats_sender.close();
        indicator_join_handle.await?;

        let duration_sec = format!("{:.3}", start_time.elapsed().as_secs_f32());
        show_migration_summary(&report, &duration_sec);

        // stop the handler so that it does not outlive the migration
        cancellation_token.cancel();

        if report.cancelled {
            error!(duration_sec = duration_sec, "s3migrate cancelled.");

            return Err(anyhow!("s3migrate cancelled."));
        }

        trace!(duration_sec = duration_sec, "s3migrate has been completed.");
        report
    };

    if is_warning_exit_required(&config, &report) {
        std::process::exit(EXIT_CODE_WARNING);
    }

    Ok(())
}

/// The first ctrl-c cancels the migration before the next identifier is started.
///
/// The handle resolves to true only when the migration was interrupted by the signal.
fn spawn_ctrl_c_handler(cancellation_token: MigrationCancellationToken) -> JoinHandle<bool> {
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => {
                debug!("ctrl-c handler stopped.");
                false
            }
            result = signal::ctrl_c() => {
                if let Err(e) = result {
                    error!(error = e.to_string(), "ctrl-c handler could not be installed.");
                    return false;
                }

                warn!("ctrl-c received. the migration stops before the next identifier.");
                cancellation_token.cancel();
                true
            }
        }
    })
}

fn is_warning_exit_required(config: &Config, report: &MigrationReport) -> bool {
    config.warn_as_error && report.has_failure()
}

fn show_migration_summary(report: &MigrationReport, duration_sec: &str) {
    if report.has_failure() {
        warn!(
            name = MIGRATION_SUMMARY_NAME,
            total_identifiers = report.total_identifiers,
            identifiers_processed = report.identifiers_processed,
            identifiers_without_objects = report.identifiers_without_objects,
            identifiers_with_list_error = report.identifiers_with_list_error,
            objects_copied = report.objects_copied,
            objects_failed = report.objects_failed,
            batches_processed = report.batches_processed,
            duration_sec = duration_sec,
            "migration finished with failures."
        );
    } else {
        info!(
            name = MIGRATION_SUMMARY_NAME,
            total_identifiers = report.total_identifiers,
            identifiers_processed = report.identifiers_processed,
            identifiers_without_objects = report.identifiers_without_objects,
            objects_copied = report.objects_copied,
            batches_processed = report.batches_processed,
            duration_sec = duration_sec,
            "migration finished."
        );
    }
}
