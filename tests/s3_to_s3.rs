#[cfg(test)]
#[cfg(feature = "e2e_test")]
mod common;

#[cfg(test)]
#[cfg(feature = "e2e_test")]
mod tests {
    use s3migrate::Config;
    use s3migrate::config::args::parse_from_args;
    use s3migrate::identifier::{LiteralIdentifierSource, fetch_identifiers_or_empty};
    use s3migrate::migration::BatchCopier;
    use s3migrate::storage::s3::S3StorageFactory;
    use s3migrate::types::MigrationReport;
    use s3migrate::types::token::create_migration_cancellation_token;

    use common::*;

    use super::*;

    async fn run_migration(extra_args: &[&str], ids: &str) -> MigrationReport {
        let mut args = vec![
            "s3migrate",
            "--profile",
            PROFILE_NAME,
            "--source-bucket",
            BUCKET1.as_str(),
            "--destination-bucket",
            BUCKET2.as_str(),
            "--table-name",
            "order",
            "--batch-interval-milliseconds",
            "0",
        ];
        args.extend_from_slice(extra_args);
        args.extend_from_slice(&["list", "--ids", ids]);

        let config = Config::try_from(parse_from_args(args).unwrap()).unwrap();
        let identifiers = fetch_identifiers_or_empty(&LiteralIdentifierSource::new(ids)).await;

        let (stats_sender, stats_receiver) = async_channel::unbounded();
        let storage = S3StorageFactory::create(&config).await;
        let batch_copier = BatchCopier::new(
            &config,
            "order",
            storage,
            create_migration_cancellation_token(),
            stats_sender,
        );

        let report = batch_copier.run(&identifiers).await;
        stats_receiver.close();

        report
    }

    async fn prepare_buckets(helper: &TestHelper) {
        helper.delete_bucket_with_cascade(BUCKET1.as_str()).await;
        helper.delete_bucket_with_cascade(BUCKET2.as_str()).await;

        helper.create_bucket(BUCKET1.as_str(), REGION).await;
        helper.create_bucket(BUCKET2.as_str(), REGION).await;
    }

    #[tokio::test]
    async fn s3_to_s3_copy_objects_of_ids() {
        TestHelper::init_dummy_tracing_subscriber();

        let _semaphore = SEMAPHORE.clone().acquire_owned().await.unwrap();
        let helper = TestHelper::new().await;
        prepare_buckets(&helper).await;

        helper
            .put_object(BUCKET1.as_str(), "orders/1/a.json", b"{\"id\":1}")
            .await;
        helper
            .put_object(BUCKET1.as_str(), "orders/2/b.json", b"{\"id\":2}")
            .await;
        helper
            .put_object(BUCKET1.as_str(), "orders/20/c.json", b"{\"id\":20}")
            .await;
        helper
            .put_object(BUCKET1.as_str(), "users/1/x.json", b"{}")
            .await;
        helper
            .put_object(BUCKET1.as_str(), "orders/1/file name+1.json", b"space")
            .await;

        let report = run_migration(&[], "1,2,3").await;

        assert_eq!(report.objects_copied, 3);
        assert_eq!(report.objects_failed, 0);
        assert_eq!(report.identifiers_without_objects, 1);

        assert_eq!(
            helper.list_object_keys(BUCKET2.as_str(), "").await,
            vec![
                "orders/1/a.json",
                "orders/1/file name+1.json",
                "orders/2/b.json"
            ]
        );
        assert_eq!(
            helper
                .get_object_body(BUCKET2.as_str(), "orders/1/a.json")
                .await,
            b"{\"id\":1}".to_vec()
        );

        // idempotent
        let report = run_migration(&[], "1,2,3").await;
        assert_eq!(report.objects_copied, 3);
        assert_eq!(helper.list_object_keys(BUCKET2.as_str(), "").await.len(), 3);

        helper.delete_bucket_with_cascade(BUCKET1.as_str()).await;
        helper.delete_bucket_with_cascade(BUCKET2.as_str()).await;
    }

    #[tokio::test]
    async fn s3_to_s3_paginated_listing() {
        TestHelper::init_dummy_tracing_subscriber();

        let _semaphore = SEMAPHORE.clone().acquire_owned().await.unwrap();
        let helper = TestHelper::new().await;
        prepare_buckets(&helper).await;

        const KEYS: [&str; 5] = [
            "orders/7/1.json",
            "orders/7/2.json",
            "orders/7/3.json",
            "orders/7/4.json",
            "orders/7/5.json",
        ];
        for key in KEYS {
            helper.put_object(BUCKET1.as_str(), key, b"data").await;
        }

        let report = run_migration(&["--max-keys", "2"], "7").await;

        assert_eq!(report.objects_copied, 5);
        assert_eq!(
            helper.list_object_keys(BUCKET2.as_str(), "orders/7/").await,
            KEYS.to_vec()
        );

        helper.delete_bucket_with_cascade(BUCKET1.as_str()).await;
        helper.delete_bucket_with_cascade(BUCKET2.as_str()).await;
    }

    #[tokio::test]
    async fn s3_to_s3_dry_run() {
        TestHelper::init_dummy_tracing_subscriber();

        let _semaphore = SEMAPHORE.clone().acquire_owned().await.unwrap();
        let helper = TestHelper::new().await;
        prepare_buckets(&helper).await;

        helper
            .put_object(BUCKET1.as_str(), "orders/1/a.json", b"{}")
            .await;

        let report = run_migration(&["--dry-run"], "1").await;

        assert_eq!(report.objects_copied, 1);
        assert!(helper.list_object_keys(BUCKET2.as_str(), "").await.is_empty());

        helper.delete_bucket_with_cascade(BUCKET1.as_str()).await;
        helper.delete_bucket_with_cascade(BUCKET2.as_str()).await;
    }
}
