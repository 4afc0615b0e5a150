use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use tracing::trace;

use crate::Config;
use crate::storage::{Storage, StorageTrait};
use crate::types::ListObjectsPage;

mod client_builder;

pub struct S3StorageFactory {}

impl S3StorageFactory {
    pub async fn create(config: &Config) -> Storage {
        let client = config.client_config.create_client().await;

        S3Storage::boxed_new(
            config.source_bucket.clone(),
            config.destination_bucket.clone(),
            Arc::new(client),
        )
    }
}

#[derive(Clone)]
struct S3Storage {
    source_bucket: String,
    destination_bucket: String,
    client: Arc<Client>,
}

impl S3Storage {
    fn boxed_new(source_bucket: String, destination_bucket: String, client: Arc<Client>) -> Storage {
        let storage = S3Storage {
            source_bucket,
            destination_bucket,
            client,
        };

        Box::new(storage)
    }
}

#[async_trait]
impl StorageTrait for S3Storage {
    async fn list_objects_page(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
        max_keys: i32,
    ) -> Result<ListObjectsPage> {
        let list_objects_output = self
            .client
            .list_objects_v2()
            .bucket(&self.source_bucket)
            .prefix(prefix)
            .set_continuation_token(continuation_token)
            .max_keys(max_keys)
            .send()
            .await
            .context("aws_sdk_s3::client::list_objects_v2() failed.")?;

        let keys: Vec<String> = list_objects_output
            .contents()
            .iter()
            .filter_map(|object| object.key())
            .map(|key| key.to_string())
            .collect();

        // a truncated page without a token cannot be continued.
        let next_continuation_token = if list_objects_output.is_truncated().unwrap_or(false) {
            list_objects_output
                .next_continuation_token()
                .map(|token| token.to_string())
        } else {
            None
        };

        trace!(
            bucket = self.source_bucket,
            prefix = prefix,
            key_count = keys.len(),
            truncated = next_continuation_token.is_some(),
            "list_objects_v2() page received."
        );

        Ok(ListObjectsPage {
            keys,
            next_continuation_token,
        })
    }

    async fn copy_object(&self, key: &str) -> Result<()> {
        self.client
            .copy_object()
            .copy_source(build_copy_source(&self.source_bucket, key))
            .bucket(&self.destination_bucket)
            .key(key)
            .send()
            .await
            .context("aws_sdk_s3::client::copy_object() failed.")?;

        Ok(())
    }
}

pub fn build_copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, urlencoding::encode(key))
}
