//! In-memory cache store

use crate::error::Result;
use crate::storage::{Cache, CacheStorage};
use crate::types::{CacheStats, Request, Response};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

struct Entry {
    request: Request,
    response: Response,
}

/// A single in-memory cache of request/response pairs
pub struct MemoryCache {
    name: String,
    entries: RwLock<HashMap<String, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCache {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn match_request(&self, request: &Request) -> Result<Option<Response>> {
        let entries = self.entries.read().await;
        match entries.get(&request.cache_key()) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(cache = %self.name, url = %request.url, "Cache hit");
                Ok(Some(entry.response.clone()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(cache = %self.name, url = %request.url, "Cache miss");
                Ok(None)
            }
        }
    }

    async fn put(&self, request: &Request, response: Response) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            request.cache_key(),
            Entry {
                request: request.clone(),
                response,
            },
        );
        Ok(())
    }

    async fn delete(&self, request: &Request) -> Result<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(&request.cache_key()).is_some())
    }

    async fn keys(&self) -> Result<Vec<Request>> {
        let entries = self.entries.read().await;
        Ok(entries.values().map(|e| e.request.clone()).collect())
    }

    async fn stats(&self) -> Result<CacheStats> {
        let entries = self.entries.read().await;
        Ok(CacheStats {
            entries: entries.len(),
            total_size: entries.values().map(|e| e.response.body.len() as u64).sum(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        })
    }
}

/// In-memory collection of named caches.
///
/// Opening the same name twice returns handles over the same cache, so
/// counters and entries are shared the way the host platform shares a
/// named store between openers.
#[derive(Default)]
pub struct MemoryCacheStorage {
    caches: RwLock<HashMap<String, Arc<MemoryCache>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn Cache>> {
        let mut caches = self.caches.write().await;
        let cache = caches
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryCache::new(name)));
        Ok(Arc::clone(cache) as Arc<dyn Cache>)
    }

    async fn names(&self) -> Result<Vec<String>> {
        let caches = self.caches.read().await;
        let mut names: Vec<String> = caches.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let mut caches = self.caches.write().await;
        let existed = caches.remove(name).is_some();
        if existed {
            debug!(cache = %name, "Deleted cache");
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_match() {
        let storage = MemoryCacheStorage::new();
        let cache = storage.open("test-cache").await.unwrap();

        let request = Request::get("/static/style.css");
        let response = Response::new(200).with_body("body { margin: 0 }");
        cache.put(&request, response.clone()).await.unwrap();

        let found = cache.match_request(&request).await.unwrap();
        assert_eq!(found, Some(response));
    }

    #[tokio::test]
    async fn test_match_is_exact() {
        let storage = MemoryCacheStorage::new();
        let cache = storage.open("test-cache").await.unwrap();

        let request = Request::get("/page");
        cache.put(&request, Response::new(200)).await.unwrap();

        let other = Request::get("/page?tab=2");
        assert!(cache.match_request(&other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_existing_entry() {
        let storage = MemoryCacheStorage::new();
        let cache = storage.open("test-cache").await.unwrap();

        let request = Request::get("/");
        cache
            .put(&request, Response::new(200).with_body("old"))
            .await
            .unwrap();
        cache
            .put(&request, Response::new(200).with_body("new"))
            .await
            .unwrap();

        let found = cache.match_request(&request).await.unwrap().unwrap();
        assert_eq!(found.body, b"new");
        assert_eq!(cache.keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let storage = MemoryCacheStorage::new();
        let cache = storage.open("test-cache").await.unwrap();

        let request = Request::get("/");
        cache.put(&request, Response::new(200)).await.unwrap();

        assert!(cache.delete(&request).await.unwrap());
        assert!(!cache.delete(&request).await.unwrap());
        assert!(cache.match_request(&request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_is_shared() {
        let storage = MemoryCacheStorage::new();
        let first = storage.open("shared").await.unwrap();
        let second = storage.open("shared").await.unwrap();

        let request = Request::get("/");
        first.put(&request, Response::new(200)).await.unwrap();

        assert!(second.match_request(&request).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_names_and_delete_cache() {
        let storage = MemoryCacheStorage::new();
        storage.open("cache-v1").await.unwrap();
        storage.open("cache-v2").await.unwrap();

        assert_eq!(storage.names().await.unwrap(), vec!["cache-v1", "cache-v2"]);

        assert!(storage.delete("cache-v1").await.unwrap());
        assert!(!storage.delete("cache-v1").await.unwrap());
        assert_eq!(storage.names().await.unwrap(), vec!["cache-v2"]);
    }

    #[tokio::test]
    async fn test_hit_miss_counters() {
        let storage = MemoryCacheStorage::new();
        let cache = storage.open("counters").await.unwrap();

        let request = Request::get("/");
        cache.match_request(&request).await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);

        cache
            .put(&request, Response::new(200).with_body("hello"))
            .await
            .unwrap();
        cache.match_request(&request).await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.total_size, 5);
    }
}
