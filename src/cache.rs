//! Generic async cache with TTL support.
//!
//! This module provides the request-keyed response cache used by the API:
//! - Async API using DashMap for concurrent access
//! - TTL (Time To Live) with background cleanup
//! - Thread-safe (Clone + Send + Sync) for use in async contexts
//! - Prefix invalidation so mutations can drop every derived view they touch

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A cache entry with optional expiration time.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The cached value
    value: V,
    /// Optional expiration timestamp (None means no expiration)
    expires_at: Option<DateTime<Utc>>,
}

impl<V> CacheEntry<V> {
    /// Create a new cache entry without expiration.
    fn new(value: V) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Create a new cache entry with expiration.
    fn with_expiration(value: V, ttl_seconds: i64) -> Self {
        Self {
            value,
            expires_at: Some(Utc::now() + Duration::seconds(ttl_seconds)),
        }
    }

    /// Check if the entry has expired.
    fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| exp < Utc::now()).unwrap_or(false)
    }
}

/// Cache configuration options.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Background cleanup interval in seconds (default: 60)
    pub cleanup_interval_seconds: u64,
    /// Default TTL in seconds for entries (None means no expiration)
    pub default_ttl_seconds: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_seconds: 60,
            default_ttl_seconds: None,
        }
    }
}

/// Local backend implementation using DashMap.
#[derive(Debug)]
pub struct LocalBackend<V> {
    /// Thread-safe storage for cache entries
    storage: Arc<DashMap<String, CacheEntry<V>>>,
    /// Background cleanup task handle
    cleanup_task: Option<JoinHandle<()>>,
    /// Cache configuration
    config: CacheConfig,
}

impl<V> LocalBackend<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + Clone + 'static,
{
    /// Create a new local backend with the given configuration.
    fn new(config: CacheConfig) -> Self {
        let storage = Arc::new(DashMap::new());
        let cleanup_task = Some(Self::spawn_cleanup_task(
            Arc::clone(&storage),
            config.cleanup_interval_seconds,
        ));

        Self {
            storage,
            cleanup_task,
            config,
        }
    }

    /// Spawn a background task to clean up expired entries.
    fn spawn_cleanup_task(
        storage: Arc<DashMap<String, CacheEntry<V>>>,
        interval_seconds: u64,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_seconds));
            loop {
                interval.tick().await;
                let now = Utc::now();
                storage.retain(|_, entry| entry.expires_at.map(|exp| exp > now).unwrap_or(true));
            }
        })
    }

    /// Get a value by key (returns None if key doesn't exist or is expired).
    async fn get(&self, key: &str) -> Option<V> {
        if let Some(entry) = self.storage.get(key) {
            if !entry.is_expired() {
                return Some(entry.value.clone());
            }
        }
        None
    }

    /// Set a value without expiration (or with the configured default TTL).
    async fn set(&self, key: &str, value: V) {
        let entry = if let Some(default_ttl) = self.config.default_ttl_seconds {
            CacheEntry::with_expiration(value, default_ttl as i64)
        } else {
            CacheEntry::new(value)
        };
        self.storage.insert(key.to_string(), entry);
    }

    /// Set a value with expiration in seconds.
    async fn set_ex(&self, key: &str, value: V, ttl_seconds: u64) {
        let entry = CacheEntry::with_expiration(value, ttl_seconds as i64);
        self.storage.insert(key.to_string(), entry);
    }

    /// Delete a key (returns true if key existed).
    async fn delete(&self, key: &str) -> bool {
        self.storage.remove(key).is_some()
    }

    /// Delete every key starting with the given prefix (returns count removed).
    async fn delete_prefix(&self, prefix: &str) -> u64 {
        let mut removed = 0u64;
        self.storage.retain(|key, _| {
            let keep = !key.starts_with(prefix);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Clear all entries (returns count of cleared entries).
    async fn clear(&self) -> usize {
        let count = self.storage.len();
        self.storage.clear();
        count
    }
}

impl<V> Drop for LocalBackend<V> {
    fn drop(&mut self) {
        // Abort the cleanup task when the backend is dropped
        if let Some(task) = self.cleanup_task.take() {
            task.abort();
        }
    }
}

/// Generic cache enum with extensible backend variants.
///
/// Currently only supports `LocalCache`, but values must stay serializable
/// so a shared backend (e.g. Redis) can be slotted in later.
#[derive(Debug)]
pub enum Cache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Local in-memory cache using DashMap
    LocalCache(LocalBackend<V>),
}

impl<V> Cache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + Clone + 'static,
{
    /// Create a new local cache with the given configuration.
    pub fn new_local(config: CacheConfig) -> Self {
        Self::LocalCache(LocalBackend::new(config))
    }

    /// Get a value by key.
    ///
    /// # Returns
    /// * `Ok(Some(value))` if key exists and is not expired
    /// * `Ok(None)` if key doesn't exist or is expired
    pub async fn get(&self, key: &str) -> Result<Option<V>> {
        match self {
            Self::LocalCache(backend) => Ok(backend.get(key).await),
        }
    }

    /// Set a value without expiration (or with default TTL if configured).
    pub async fn set(&self, key: &str, value: V) -> Result<()> {
        match self {
            Self::LocalCache(backend) => {
                backend.set(key, value).await;
                Ok(())
            }
        }
    }

    /// Set a value with expiration in seconds.
    pub async fn set_ex(&self, key: &str, value: V, ttl_seconds: u64) -> Result<()> {
        match self {
            Self::LocalCache(backend) => {
                backend.set_ex(key, value, ttl_seconds).await;
                Ok(())
            }
        }
    }

    /// Delete a key.
    ///
    /// # Returns
    /// * `Ok(true)` if key existed and was deleted
    /// * `Ok(false)` if key didn't exist
    pub async fn delete(&self, key: &str) -> Result<bool> {
        match self {
            Self::LocalCache(backend) => Ok(backend.delete(key).await),
        }
    }

    /// Delete every key starting with the given prefix.
    ///
    /// Mutations use this to invalidate all cached list views of a workspace
    /// in one call, the same way the original client dropped query-cache
    /// entries by key prefix.
    pub async fn delete_prefix(&self, prefix: &str) -> Result<u64> {
        match self {
            Self::LocalCache(backend) => Ok(backend.delete_prefix(prefix).await),
        }
    }

    /// Clear all entries from the cache.
    pub async fn clear(&self) -> Result<usize> {
        match self {
            Self::LocalCache(backend) => Ok(backend.clear().await),
        }
    }
}

// Implement Clone for Cache (shallow clone via Arc)
impl<V> Clone for Cache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        match self {
            // LocalBackend stores Arc<DashMap>, so cloning is cheap. The clone
            // shares storage but carries no cleanup task of its own; the
            // original backend's task cleans up for all shared references.
            Self::LocalCache(backend) => {
                let storage = Arc::clone(&backend.storage);
                let config = backend.config.clone();

                Self::LocalCache(LocalBackend {
                    storage,
                    cleanup_task: None,
                    config,
                })
            }
        }
    }
}

/// Cache key builders.
///
/// Every cacheable operation derives its key here so that reads and the
/// invalidation calls issued by mutations can never drift apart.
pub mod keys {
    use uuid::Uuid;

    /// Key prefix for all task list views of a workspace.
    pub fn task_list_prefix(workspace_id: Uuid) -> String {
        format!("tasks:list:{}:", workspace_id)
    }

    /// Key for one task list view (filter/sort spec already serialized).
    pub fn task_list(workspace_id: Uuid, spec: &str) -> String {
        format!("{}{}", task_list_prefix(workspace_id), spec)
    }

    /// Key for a single task detail.
    pub fn task_detail(task_id: Uuid) -> String {
        format!("tasks:detail:{}", task_id)
    }

    /// Key prefix for all per-user workspace lists.
    pub fn workspace_list_prefix() -> String {
        "workspaces:list:".to_string()
    }

    /// Key for one user's workspace list.
    pub fn workspace_list(user_id: Uuid) -> String {
        format!("{}{}", workspace_list_prefix(), user_id)
    }

    /// Key for a single workspace detail as seen by one user.
    pub fn workspace_detail(workspace_id: Uuid, user_id: Uuid) -> String {
        format!("workspaces:detail:{}:{}", workspace_id, user_id)
    }

    /// Key prefix covering every cached view of a single workspace.
    pub fn workspace_detail_prefix(workspace_id: Uuid) -> String {
        format!("workspaces:detail:{}:", workspace_id)
    }

    /// Key for an authenticated user entry.
    pub fn user(user_id: Uuid) -> String {
        format!("user:{}", user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_set_get() {
        let cache: Cache<String> = Cache::new_local(CacheConfig::default());

        cache.set("key1", "value1".to_string()).await.unwrap();
        let value = cache.get("key1").await.unwrap();

        assert_eq!(value, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let cache: Cache<String> = Cache::new_local(CacheConfig::default());

        cache.set("key1", "value1".to_string()).await.unwrap();
        assert!(cache.delete("key1").await.unwrap());
        assert!(!cache.delete("key1").await.unwrap());

        assert_eq!(cache.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_prefix_removes_only_matching_keys() {
        let cache: Cache<String> = Cache::new_local(CacheConfig::default());
        let ws = uuid::Uuid::now_v7();
        let other = uuid::Uuid::now_v7();

        cache
            .set(&keys::task_list(ws, "a"), "1".to_string())
            .await
            .unwrap();
        cache
            .set(&keys::task_list(ws, "b"), "2".to_string())
            .await
            .unwrap();
        cache
            .set(&keys::task_list(other, "a"), "3".to_string())
            .await
            .unwrap();

        let removed = cache
            .delete_prefix(&keys::task_list_prefix(ws))
            .await
            .unwrap();
        assert_eq!(removed, 2);

        assert_eq!(cache.get(&keys::task_list(ws, "a")).await.unwrap(), None);
        assert_eq!(
            cache.get(&keys::task_list(other, "a")).await.unwrap(),
            Some("3".to_string())
        );
    }

    #[tokio::test]
    async fn test_expired_entry_is_invisible() {
        let cache: Cache<String> = Cache::new_local(CacheConfig::default());

        cache.set_ex("key1", "value1".to_string(), 0).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(cache.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache: Cache<String> = Cache::new_local(CacheConfig::default());

        cache.set("a", "1".to_string()).await.unwrap();
        cache.set("b", "2".to_string()).await.unwrap();
        assert_eq!(cache.clear().await.unwrap(), 2);
        assert_eq!(cache.get("a").await.unwrap(), None);
    }

    #[test]
    fn test_key_builders_share_prefixes() {
        let ws = uuid::Uuid::now_v7();
        let user = uuid::Uuid::now_v7();

        assert!(keys::task_list(ws, "spec").starts_with(&keys::task_list_prefix(ws)));
        assert!(keys::workspace_list(user).starts_with(&keys::workspace_list_prefix()));
        assert!(
            keys::workspace_detail(ws, user).starts_with(&keys::workspace_detail_prefix(ws))
        );
    }
}
