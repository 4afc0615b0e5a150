use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::storage::{Storage, StorageTrait};
use crate::types::ListObjectsPage;

/// Two buckets held in memory.
///
/// Clones share the same buckets, so a test can keep one handle for assertions after
/// handing a boxed clone to the copier. Failures can be injected per copy key and per
/// listing prefix.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    buckets: Arc<Mutex<MemoryBuckets>>,
}

#[derive(Debug, Default)]
struct MemoryBuckets {
    source: BTreeMap<String, Vec<u8>>,
    destination: BTreeMap<String, Vec<u8>>,
    copy_failures: HashMap<String, u32>,
    list_failures: HashSet<String>,
    list_calls: usize,
    copy_calls: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed(&self) -> Storage {
        Box::new(self.clone())
    }

    pub async fn put_source_object(&self, key: &str, body: &[u8]) {
        self.buckets
            .lock()
            .await
            .source
            .insert(key.to_string(), body.to_vec());
    }

    pub async fn destination_object(&self, key: &str) -> Option<Vec<u8>> {
        self.buckets.lock().await.destination.get(key).cloned()
    }

    pub async fn destination_keys(&self) -> Vec<String> {
        self.buckets
            .lock()
            .await
            .destination
            .keys()
            .cloned()
            .collect()
    }

    /// The next `times` copies of `key` fail.
    pub async fn fail_copy(&self, key: &str, times: u32) {
        self.buckets
            .lock()
            .await
            .copy_failures
            .insert(key.to_string(), times);
    }

    /// Every listing under exactly `prefix` fails.
    pub async fn fail_list(&self, prefix: &str) {
        self.buckets
            .lock()
            .await
            .list_failures
            .insert(prefix.to_string());
    }

    pub async fn list_call_count(&self) -> usize {
        self.buckets.lock().await.list_calls
    }

    pub async fn copy_call_count(&self) -> usize {
        self.buckets.lock().await.copy_calls
    }
}

#[async_trait]
impl StorageTrait for MemoryStorage {
    async fn list_objects_page(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
        max_keys: i32,
    ) -> Result<ListObjectsPage> {
        let mut buckets = self.buckets.lock().await;
        buckets.list_calls += 1;

        if buckets.list_failures.contains(prefix) {
            return Err(anyhow!("list_objects_v2() failed. prefix: {}", prefix));
        }

        // the token is the last key of the previous page.
        let lower_bound = match &continuation_token {
            Some(token) => Bound::Excluded(token.clone()),
            None => Bound::Included(prefix.to_string()),
        };

        let page_size = max_keys.max(1) as usize;
        let mut matching_keys = buckets
            .source
            .range((lower_bound, Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix));

        let keys: Vec<String> = matching_keys.by_ref().take(page_size).cloned().collect();
        let next_continuation_token = if matching_keys.next().is_some() {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ListObjectsPage {
            keys,
            next_continuation_token,
        })
    }

    async fn copy_object(&self, key: &str) -> Result<()> {
        let mut buckets = self.buckets.lock().await;
        buckets.copy_calls += 1;

        if let Some(remaining) = buckets.copy_failures.get_mut(key) {
            if 0 < *remaining {
                *remaining -= 1;
                return Err(anyhow!("copy_object() failed. key: {}", key));
            }
        }

        let body = buckets
            .source
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("NoSuchKey: {}", key))?;
        buckets.destination.insert(key.to_string(), body);

        Ok(())
    }
}
