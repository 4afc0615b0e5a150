use std::sync::Arc;
use std::time::Duration;

use leaky_bucket::RateLimiter;
use tracing::debug;

use crate::Config;
use crate::types::token::MigrationCancellationToken;

// default refill interval 100ms
const REFILL_PER_INTERVAL_DIVIDER: usize = 10;

/// Throttles the copy loop: a fixed pause between batches and an optional per-object rate limit.
#[derive(Clone)]
pub struct BatchPacer {
    batch_interval: Duration,
    rate_limit_objects_per_sec: Option<Arc<RateLimiter>>,
    cancellation_token: MigrationCancellationToken,
}

impl BatchPacer {
    pub fn new(config: &Config, cancellation_token: MigrationCancellationToken) -> Self {
        Self {
            batch_interval: Duration::from_millis(
                config.batch_config.batch_interval_milliseconds,
            ),
            rate_limit_objects_per_sec: config.rate_limit_objects.map(build_rate_limiter),
            cancellation_token,
        }
    }

    /// Returns false when cancelled while waiting.
    pub async fn pause_between_batches(&self) -> bool {
        if self.batch_interval.is_zero() {
            return !self.cancellation_token.is_cancelled();
        }

        debug!(
            interval_milliseconds = self.batch_interval.as_millis() as u64,
            "pausing before next batch."
        );

        tokio::select! {
            _ = tokio::time::sleep(self.batch_interval) => true,
            _ = self.cancellation_token.cancelled() => false,
        }
    }

    pub async fn acquire_copy_permit(&self) {
        if let Some(rate_limiter) = &self.rate_limit_objects_per_sec {
            rate_limiter.acquire(1).await;
        }
    }
}

fn build_rate_limiter(rate_limit_objects: u32) -> Arc<RateLimiter> {
    let refill = if rate_limit_objects <= REFILL_PER_INTERVAL_DIVIDER as u32 {
        1
    } else {
        rate_limit_objects as usize / REFILL_PER_INTERVAL_DIVIDER
    };

    Arc::new(
        RateLimiter::builder()
            .max(rate_limit_objects as usize)
            .initial(rate_limit_objects as usize)
            .refill(refill)
            .fair(true)
            .build(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::args::build_config_from_args;
    use crate::types::token::create_migration_cancellation_token;
    use tokio::time::Instant;

    fn build_config(extra_args: &[&str]) -> Config {
        let mut args = vec![
            "s3migrate",
            "--source-bucket",
            "source-bucket",
            "--destination-bucket",
            "destination-bucket",
        ];
        args.extend_from_slice(extra_args);
        args.push("list");

        build_config_from_args(args).unwrap()
    }

    #[tokio::test]
    async fn pause_waits_interval() {
        init_dummy_tracing_subscriber();

        let config = build_config(&["--batch-interval-milliseconds", "200"]);
        let pacer = BatchPacer::new(&config, create_migration_cancellation_token());

        let start = Instant::now();
        assert!(pacer.pause_between_batches().await);
        assert!(Duration::from_millis(200) <= start.elapsed());
    }

    #[tokio::test]
    async fn pause_disabled() {
        init_dummy_tracing_subscriber();

        let config = build_config(&["--batch-interval-milliseconds", "0"]);
        let pacer = BatchPacer::new(&config, create_migration_cancellation_token());

        let start = Instant::now();
        assert!(pacer.pause_between_batches().await);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn pause_interrupted_by_cancellation() {
        init_dummy_tracing_subscriber();

        let config = build_config(&["--batch-interval-milliseconds", "60000"]);
        let cancellation_token = create_migration_cancellation_token();
        let pacer = BatchPacer::new(&config, cancellation_token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancellation_token.cancel();
        });

        let start = Instant::now();
        assert!(!pacer.pause_between_batches().await);
        assert!(start.elapsed() < Duration::from_secs(10));

        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn rate_limit_objects() {
        init_dummy_tracing_subscriber();

        let config = build_config(&["--rate-limit-objects", "10"]);
        let pacer = BatchPacer::new(&config, create_migration_cancellation_token());

        // the initial burst is free, the next permits refill one per 100ms
        let start = Instant::now();
        for _ in 0..13 {
            pacer.acquire_copy_permit().await;
        }
        assert!(Duration::from_millis(200) <= start.elapsed());
    }

    #[tokio::test]
    async fn no_rate_limit() {
        init_dummy_tracing_subscriber();

        let config = build_config(&[]);
        let pacer = BatchPacer::new(&config, create_migration_cancellation_token());

        let start = Instant::now();
        for _ in 0..1000 {
            pacer.acquire_copy_permit().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
