//! Fragment caching with tag invalidation and single-flight rendering.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use region_core::{earliest, Expiry, Tag, TagCollector};
use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use crate::key::FragmentKey;
use crate::policy::FragmentPolicy;
use crate::store::{FragmentStore, MemoryStore};

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Backend storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Status of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Fresh cache hit.
    Hit,
    /// Cache miss, including expired entries.
    Miss,
    /// Bypass - caching disabled for the region.
    Bypass,
    /// Error during cache operation; treated as a miss.
    Error,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Bypass => write!(f, "BYPASS"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A cached fragment. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached HTML content.
    pub html: String,
    /// Tags of all data the content depends on.
    pub tags: BTreeSet<Tag>,
    /// When the entry stops being valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Expiry,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create a new entry.
    pub fn new(html: impl Into<String>, tags: BTreeSet<Tag>, expiry: Expiry) -> Self {
        Self {
            html: html.into(),
            tags,
            expiry,
            created_at: Utc::now(),
        }
    }

    /// Check if the entry has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.map_or(false, |at| at <= now)
    }

    /// Check if the entry has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Tags and expiry as a collector.
    pub fn collector(&self) -> TagCollector {
        let mut collector = TagCollector::new();
        collector.add_tags(self.tags.iter().cloned());
        collector.expire_at(self.expiry);
        collector
    }
}

/// Result of a cache get operation with metadata.
#[derive(Debug)]
pub struct CacheGetResult {
    /// The cached entry (if found).
    pub entry: Option<CacheEntry>,
    /// Cache status.
    pub status: CacheStatus,
}

impl CacheGetResult {
    /// Create a hit result.
    pub fn hit(entry: CacheEntry) -> Self {
        Self {
            entry: Some(entry),
            status: CacheStatus::Hit,
        }
    }

    /// Create a miss result.
    pub fn miss() -> Self {
        Self {
            entry: None,
            status: CacheStatus::Miss,
        }
    }

    /// Create a bypass result.
    pub fn bypass() -> Self {
        Self {
            entry: None,
            status: CacheStatus::Bypass,
        }
    }

    /// Create an error result.
    pub fn error() -> Self {
        Self {
            entry: None,
            status: CacheStatus::Error,
        }
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing usable.
    pub misses: u64,
    /// Entries written.
    pub stores: u64,
    /// Entries removed by tag invalidation.
    pub invalidations: u64,
    /// Entries currently stored.
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that were hits.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    invalidations: AtomicU64,
}

type FlightMap = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

/// Exclusive right to render one key.
///
/// Other callers asking for the same key wait until the guard is dropped,
/// then re-read the cache.
pub struct FlightGuard {
    key: String,
    flights: FlightMap,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut flights = match self.flights.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // The map and this guard hold the only references when nobody waits.
        let idle = flights
            .get(&self.key)
            .map_or(false, |lock| Arc::strong_count(lock) <= 2);
        if idle {
            flights.remove(&self.key);
        }
    }
}

/// Fragment cache shared by all render passes.
pub struct FragmentCache {
    store: Arc<dyn FragmentStore>,
    flights: FlightMap,
    counters: Counters,
}

impl FragmentCache {
    /// Create a cache over a storage backend.
    pub fn new(store: impl FragmentStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
            flights: Arc::new(Mutex::new(HashMap::new())),
            counters: Counters::default(),
        }
    }

    /// Create a cache backed by a [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Get a cached fragment. Expired entries are deleted and reported as a miss.
    pub async fn get(&self, key: &FragmentKey, policy: &FragmentPolicy) -> CacheGetResult {
        if !policy.enabled {
            return CacheGetResult::bypass();
        }

        let key_str = key.as_str();

        match self.store.get(&key_str).await {
            Ok(Some(entry)) if entry.is_expired() => {
                debug!(key = %key_str, "Cache entry expired");
                if let Err(e) = self.store.delete(&key_str).await {
                    warn!(key = %key_str, error = %e, "Failed to delete expired entry");
                }
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                CacheGetResult::miss()
            }
            Ok(Some(entry)) => {
                debug!(key = %key_str, "Cache hit");
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                CacheGetResult::hit(entry)
            }
            Ok(None) => {
                debug!(key = %key_str, "Cache miss");
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                CacheGetResult::miss()
            }
            Err(e) => {
                warn!(key = %key_str, error = %e, "Cache lookup failed");
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                CacheGetResult::error()
            }
        }
    }

    /// Look up a fresh entry without counting a hit or miss.
    ///
    /// Used to re-check the cache after waiting for another renderer.
    pub async fn peek(&self, key: &FragmentKey, policy: &FragmentPolicy) -> Option<CacheEntry> {
        if !policy.enabled {
            return None;
        }

        match self.store.get(&key.as_str()).await {
            Ok(Some(entry)) if !entry.is_expired() => Some(entry),
            _ => None,
        }
    }

    /// Store a fragment with the collected tags and expiry.
    ///
    /// The policy's static tags are added and its TTL caps the expiry.
    pub async fn put(
        &self,
        key: &FragmentKey,
        html: impl Into<String>,
        collected: &TagCollector,
        policy: &FragmentPolicy,
    ) -> CacheResult<()> {
        if !policy.enabled {
            return Ok(());
        }

        let mut tags = collected.tags().clone();
        tags.extend(policy.tags.iter().map(|t| Tag::new(t.as_str())));

        let ttl_expiry = policy
            .ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .map(|ttl| Utc::now() + ttl);
        let expiry = earliest(collected.expiry(), ttl_expiry);

        let key_str = key.as_str();
        self.store
            .set(&key_str, CacheEntry::new(html, tags, expiry))
            .await?;
        self.counters.stores.fetch_add(1, Ordering::Relaxed);

        debug!(key = %key_str, "Stored fragment");
        Ok(())
    }

    /// Invalidate every entry holding one of the tags.
    pub async fn invalidate(&self, tags: &[Tag]) -> CacheResult<u64> {
        let removed = self.store.invalidate_tags(tags).await?;
        self.counters
            .invalidations
            .fetch_add(removed, Ordering::Relaxed);

        let tag_list: Vec<&str> = tags.iter().map(Tag::as_str).collect();
        info!(tags = ?tag_list, removed, "Invalidated cache tags");
        Ok(removed)
    }

    /// Delete a specific entry.
    pub async fn delete(&self, key: &FragmentKey) -> CacheResult<()> {
        self.store.delete(&key.as_str()).await
    }

    /// Delete all entries.
    pub async fn clear(&self) -> CacheResult<()> {
        self.store.clear().await
    }

    /// Wait for exclusive rendering rights on a key.
    pub async fn acquire(&self, key: &FragmentKey) -> FlightGuard {
        let key_str = key.as_str();

        let lock = {
            let mut flights = match self.flights.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            flights
                .entry(key_str.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };

        FlightGuard {
            key: key_str,
            flights: Arc::clone(&self.flights),
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of keys currently being rendered or waited on.
    pub fn in_flight(&self) -> usize {
        match self.flights.lock() {
            Ok(flights) => flights.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Current counters.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            stores: self.counters.stores.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
            entries: self.store.len().await,
        }
    }
}

impl Default for FragmentCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for FragmentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentCache")
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{FragmentKeyBuilder, Part};
    use region_core::PageRequest;
    use std::time::Duration;

    fn key(region: &str) -> FragmentKey {
        FragmentKeyBuilder::new().build(region, Part::Body, "", &PageRequest::new())
    }

    fn collector(tags: &[&str], expiry: Expiry) -> TagCollector {
        let mut c = TagCollector::new();
        c.add_tags(tags.iter().copied());
        c.expire_at(expiry);
        c
    }

    // === Lookup Tests ===

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = FragmentCache::in_memory();
        let policy = FragmentPolicy::new();
        let key = key("catalog/detail");

        assert_eq!(cache.get(&key, &policy).await.status, CacheStatus::Miss);

        cache
            .put(&key, "<p>x</p>", &collector(&["product-1"], None), &policy)
            .await
            .unwrap();

        let result = cache.get(&key, &policy).await;
        assert_eq!(result.status, CacheStatus::Hit);
        assert_eq!(result.entry.unwrap().html, "<p>x</p>");

        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses, stats.stores), (1, 1, 1));
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_disabled_policy_bypasses() {
        let cache = FragmentCache::in_memory();
        let policy = FragmentPolicy::none();
        let key = key("catalog/stage/navigator");

        cache
            .put(&key, "live", &TagCollector::new(), &policy)
            .await
            .unwrap();

        assert_eq!(cache.get(&key, &policy).await.status, CacheStatus::Bypass);
        assert_eq!(cache.stats().await.entries, 0);
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss_and_deleted() {
        let cache = FragmentCache::in_memory();
        let policy = FragmentPolicy::new();
        let key = key("catalog/detail");
        let past = Utc::now() - chrono::Duration::seconds(5);

        cache
            .put(&key, "old", &collector(&[], Some(past)), &policy)
            .await
            .unwrap();

        assert_eq!(cache.get(&key, &policy).await.status, CacheStatus::Miss);
        assert_eq!(cache.stats().await.entries, 0);
    }

    // === Expiry Tests ===

    #[tokio::test]
    async fn test_ttl_caps_expiry() {
        let store = MemoryStore::new();
        let cache = FragmentCache::new(store.clone());
        let policy = FragmentPolicy::new().with_ttl(Duration::from_secs(60));
        let key = key("catalog/detail");
        let far = Utc::now() + chrono::Duration::days(30);

        cache
            .put(&key, "x", &collector(&[], Some(far)), &policy)
            .await
            .unwrap();

        let entry = store.get(&key.as_str()).await.unwrap().unwrap();
        let expiry = entry.expiry.unwrap();
        assert!(expiry < far);
        assert!(expiry > Utc::now());
    }

    #[tokio::test]
    async fn test_static_tags_added() {
        let store = MemoryStore::new();
        let cache = FragmentCache::new(store.clone());
        let policy = FragmentPolicy::new().with_tag("catalog");
        let key = key("catalog/detail");

        cache
            .put(&key, "x", &collector(&["product-1"], None), &policy)
            .await
            .unwrap();

        let entry = store.get(&key.as_str()).await.unwrap().unwrap();
        assert!(entry.tags.contains(&Tag::new("catalog")));
        assert!(entry.tags.contains(&Tag::new("product-1")));
        assert_eq!(entry.collector().tags().len(), 2);
    }

    // === Invalidation Tests ===

    #[tokio::test]
    async fn test_invalidate_affects_only_tagged_keys() {
        let cache = FragmentCache::in_memory();
        let policy = FragmentPolicy::new();
        let detail = key("catalog/detail");
        let related = key("basket/related/bought");

        cache
            .put(&detail, "d", &collector(&["product-1", "attribute-7"], None), &policy)
            .await
            .unwrap();
        cache
            .put(&related, "r", &collector(&["product-2"], None), &policy)
            .await
            .unwrap();

        let removed = cache.invalidate(&[Tag::new("attribute-7")]).await.unwrap();

        assert_eq!(removed, 1);
        assert_eq!(cache.get(&detail, &policy).await.status, CacheStatus::Miss);
        assert_eq!(cache.get(&related, &policy).await.status, CacheStatus::Hit);
        assert_eq!(cache.stats().await.invalidations, 1);
    }

    // === Single-Flight Tests ===

    #[tokio::test]
    async fn test_acquire_serializes_same_key() {
        let cache = Arc::new(FragmentCache::in_memory());
        let key = key("catalog/detail");

        let guard = cache.acquire(&key).await;
        assert_eq!(cache.in_flight(), 1);

        let waiter = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            tokio::spawn(async move {
                let _guard = cache.acquire(&key).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert_eq!(cache.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_acquire_different_keys_independent() {
        let cache = FragmentCache::in_memory();

        let _a = cache.acquire(&key("catalog/detail")).await;
        let _b = cache.acquire(&key("basket/related/bought")).await;

        assert_eq!(cache.in_flight(), 2);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
