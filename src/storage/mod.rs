use anyhow::Result;
use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::types::ListObjectsPage;

pub mod memory;
pub mod s3;

pub type Storage = Box<dyn StorageTrait + Send + Sync>;

/// Source and destination of a migration.
///
/// Listing always reads the source bucket and copying always writes the destination bucket,
/// so a key never has to carry its bucket.
#[async_trait]
pub trait StorageTrait: DynClone {
    /// Lists one page of source keys under `prefix`.
    /// The returned page has no continuation token when it is the last one.
    async fn list_objects_page(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
        max_keys: i32,
    ) -> Result<ListObjectsPage>;

    /// Server-side copy of `key` from the source bucket to the same key in the destination bucket.
    async fn copy_object(&self, key: &str) -> Result<()>;
}
