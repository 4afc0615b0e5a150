use anyhow::Result;
use tracing::trace;

use crate::storage::Storage;
use crate::types::error::S3migrateError;
use crate::types::token::MigrationCancellationToken;

/// Collects every source key under `prefix`, following continuation tokens to the last page.
pub async fn list_all_keys(
    storage: &Storage,
    prefix: &str,
    max_keys: i32,
    cancellation_token: &MigrationCancellationToken,
) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    let mut continuation_token = None;

    loop {
        if cancellation_token.is_cancelled() {
            trace!(prefix = prefix, "list_all_keys() cancelled.");
            return Err(S3migrateError::Cancelled.into());
        }

        let page = storage
            .list_objects_page(prefix, continuation_token, max_keys)
            .await?;
        keys.extend(page.keys);

        if page.next_continuation_token.is_none() {
            break;
        }
        continuation_token = page.next_continuation_token;
    }

    Ok(keys)
}
