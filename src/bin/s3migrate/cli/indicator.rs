use std::io;
use std::io::Write;

use async_channel::Receiver;
use indicatif::{HumanCount, HumanDuration, ProgressBar, ProgressStyle};
use s3migrate::types::MigrationStatistics;
use simple_moving_average::{SMA, SumTreeSMA};
use tokio::task::JoinHandle;
use tokio::time::Instant;

const MOVING_AVERAGE_PERIOD_SECS: usize = 10;
const REFRESH_INTERVAL: f32 = 1.0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorTotals {
    pub copied: u64,
    pub failed: u64,
    pub identifiers_without_objects: u64,
    pub identifiers_with_error: u64,
    pub batches: u64,
}

impl IndicatorTotals {
    fn add(&mut self, stats: &MigrationStatistics) {
        match stats {
            MigrationStatistics::CopyComplete { .. } => self.copied += 1,
            MigrationStatistics::CopyError { .. } => self.failed += 1,
            MigrationStatistics::IdentifierEmpty { .. } => self.identifiers_without_objects += 1,
            MigrationStatistics::IdentifierError { .. } => self.identifiers_with_error += 1,
            MigrationStatistics::BatchComplete { .. } => self.batches += 1,
        }
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Consumes migration statistics until the channel is closed and returns the totals.
pub fn show_indicator(
    stats_receiver: Receiver<MigrationStatistics>,
    show_progress: bool,
    show_result: bool,
    dry_run: bool,
) -> JoinHandle<IndicatorTotals> {
    let progress_text = ProgressBar::new(0);
    progress_text.set_style(style("{wide_msg}"));

    tokio::spawn(async move {
        let start_time = Instant::now();
        let mut ma_copied_count = SumTreeSMA::<_, u64, MOVING_AVERAGE_PERIOD_SECS>::new();
        let mut totals = IndicatorTotals::default();

        loop {
            let mut copied_count: u64 = 0;

            let period = Instant::now();
            loop {
                while let Ok(stats) = stats_receiver.try_recv() {
                    if matches!(stats, MigrationStatistics::CopyComplete { .. }) {
                        copied_count += 1;
                    }
                    totals.add(&stats);
                }

                if REFRESH_INTERVAL < period.elapsed().as_secs_f32() {
                    break;
                }

                if stats_receiver.is_closed() {
                    let elapsed = start_time.elapsed();
                    let elapsed_secs_f64 = elapsed.as_secs_f64();

                    let mut objects_per_sec = (totals.copied as f64 / elapsed_secs_f64) as u64;
                    if elapsed_secs_f64 < REFRESH_INTERVAL as f64 {
                        objects_per_sec = totals.copied;
                    }
                    if dry_run {
                        objects_per_sec = 0;
                    }

                    if show_result {
                        progress_text.set_style(style("{msg}"));
                        progress_text.finish_with_message(format!(
                            "{} {:>3} objects | {:>3} objects/sec,  failed {} objects,  ids without objects {},  ids with listing error {},  batches {},  duration {}",
                            if dry_run { "[dry-run] copied" } else { "copied" },
                            totals.copied,
                            HumanCount(objects_per_sec),
                            totals.failed,
                            totals.identifiers_without_objects,
                            totals.identifiers_with_error,
                            totals.batches,
                            HumanDuration(elapsed),
                        ));

                        println!();
                        let _ = io::stdout().flush();
                    }

                    return totals;
                }

                tokio::time::sleep(std::time::Duration::from_secs_f32(0.05)).await;
            }

            if !dry_run {
                ma_copied_count.add_sample(copied_count);
            }

            if show_progress {
                progress_text.set_message(format!(
                    "copied {:>3} objects | {:>3} objects/sec,  failed {} objects,  ids without objects {},  ids with listing error {},  batches {}",
                    totals.copied,
                    HumanCount(ma_copied_count.get_average()).to_string(),
                    totals.failed,
                    totals.identifiers_without_objects,
                    totals.identifiers_with_error,
                    totals.batches,
                ));
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const WAITING_TIME_MILLIS_FOR_ASYNC_INDICATOR_SET_MESSAGE: u64 = 1500;

    async fn send_all_kinds(stats_sender: &async_channel::Sender<MigrationStatistics>) {
        stats_sender
            .send(MigrationStatistics::CopyComplete {
                key: "orders/1/a.json".to_string(),
            })
            .await
            .unwrap();
        stats_sender
            .send(MigrationStatistics::CopyError {
                key: "orders/1/b.json".to_string(),
            })
            .await
            .unwrap();
        stats_sender
            .send(MigrationStatistics::IdentifierEmpty {
                identifier: "2".to_string(),
            })
            .await
            .unwrap();
        stats_sender
            .send(MigrationStatistics::IdentifierError {
                identifier: "3".to_string(),
            })
            .await
            .unwrap();
        stats_sender
            .send(MigrationStatistics::BatchComplete { batch_number: 1 })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn indicator_test_show_result() {
        init_dummy_tracing_subscriber();

        let (stats_sender, stats_receiver) = async_channel::unbounded();
        let join_handle = show_indicator(stats_receiver, true, true, false);

        send_all_kinds(&stats_sender).await;

        tokio::time::sleep(Duration::from_millis(
            WAITING_TIME_MILLIS_FOR_ASYNC_INDICATOR_SET_MESSAGE,
        ))
        .await;
        stats_sender.close();

        let totals = join_handle.await.unwrap();
        assert_eq!(
            totals,
            IndicatorTotals {
                copied: 1,
                failed: 1,
                identifiers_without_objects: 1,
                identifiers_with_error: 1,
                batches: 1,
            }
        );
    }

    #[tokio::test]
    async fn indicator_test_close_immediately() {
        init_dummy_tracing_subscriber();

        let (stats_sender, stats_receiver) = async_channel::unbounded();
        let join_handle = show_indicator(stats_receiver, false, false, false);

        send_all_kinds(&stats_sender).await;
        stats_sender.close();

        let totals = join_handle.await.unwrap();
        assert_eq!(totals.copied, 1);
        assert_eq!(totals.batches, 1);
    }

    #[tokio::test]
    async fn indicator_test_show_result_dry_run() {
        init_dummy_tracing_subscriber();

        let (stats_sender, stats_receiver) = async_channel::unbounded();
        let join_handle = show_indicator(stats_receiver, true, true, true);

        send_all_kinds(&stats_sender).await;

        tokio::time::sleep(Duration::from_millis(
            WAITING_TIME_MILLIS_FOR_ASYNC_INDICATOR_SET_MESSAGE,
        ))
        .await;
        stats_sender.close();

        join_handle.await.unwrap();
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
