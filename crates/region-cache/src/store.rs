//! Fragment storage backends.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use region_core::Tag;
use tokio::sync::RwLock;
use tracing::debug;

use crate::fragment::{CacheEntry, CacheResult};

/// Fragment storage backend trait.
#[async_trait]
pub trait FragmentStore: Send + Sync {
    /// Get an entry.
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry>>;

    /// Store an entry, replacing any previous one.
    async fn set(&self, key: &str, entry: CacheEntry) -> CacheResult<()>;

    /// Delete an entry.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Delete every entry holding at least one of the tags.
    async fn invalidate_tags(&self, tags: &[Tag]) -> CacheResult<u64>;

    /// Delete all entries.
    async fn clear(&self) -> CacheResult<()>;

    /// Number of stored entries.
    async fn len(&self) -> usize;
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    /// tag -> keys of entries holding it
    tag_index: HashMap<Tag, HashSet<String>>,
}

impl Inner {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;

        for tag in &entry.tags {
            if let Some(keys) = self.tag_index.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tag_index.remove(tag);
                }
            }
        }
        Some(entry)
    }
}

/// In-memory fragment store with a tag index.
///
/// Readers share the lock; writes are last-writer-wins.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently holding `tag`.
    pub async fn keys_for_tag(&self, tag: &Tag) -> Vec<String> {
        let inner = self.inner.read().await;
        let mut keys: Vec<String> = inner
            .tag_index
            .get(tag)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[async_trait]
impl FragmentStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        let inner = self.inner.read().await;
        Ok(inner.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, entry: CacheEntry) -> CacheResult<()> {
        let mut inner = self.inner.write().await;
        inner.remove(key);

        for tag in &entry.tags {
            inner
                .tag_index
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
        inner.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut inner = self.inner.write().await;
        inner.remove(key);
        Ok(())
    }

    async fn invalidate_tags(&self, tags: &[Tag]) -> CacheResult<u64> {
        let mut inner = self.inner.write().await;

        let keys: HashSet<String> = tags
            .iter()
            .filter_map(|tag| inner.tag_index.get(tag))
            .flat_map(|keys| keys.iter().cloned())
            .collect();

        let mut removed = 0;
        for key in keys {
            if inner.remove(&key).is_some() {
                debug!(key = %key, "Removed tagged entry");
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn clear(&self) -> CacheResult<()> {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.tag_index.clear();
        Ok(())
    }

    async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}
