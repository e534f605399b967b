//! File-backed cache store
//!
//! One directory per cache name; each entry is a body file plus a JSON
//! metadata sidecar keyed by the SHA-256 of the request's cache key. Entries
//! survive process restarts, which is what the app shell relies on when the
//! first request after a restart arrives offline.

use crate::error::Result;
use crate::storage::{Cache, CacheStorage};
use crate::types::{CacheStats, Request, Response};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

/// Persisted metadata for a cached entry
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    request: Request,
    status: u16,
    headers: HashMap<String, String>,
    size: u64,
    cached_at: DateTime<Utc>,
}

/// File-backed collection of named caches rooted at a single directory.
///
/// Cache names become directory names directly; the worker only produces
/// prefix-plus-version slugs, which are filesystem-safe by construction.
pub struct FileCacheStorage {
    root: PathBuf,
}

impl FileCacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Ensure the root directory exists.
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        info!(root = ?self.root, "Cache storage initialized");
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for FileCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn Cache>> {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir).await?;
        Ok(Arc::new(FileCache {
            name: name.to_string(),
            dir,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }))
    }

    async fn names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(names),
            Err(err) => return Err(err.into()),
        };
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let dir = self.root.join(name);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!(cache = %name, "Deleted cache directory");
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// A single file-backed cache.
///
/// Hit/miss counters are tracked per handle, not persisted.
pub struct FileCache {
    name: String,
    dir: PathBuf,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FileCache {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn entry_key(request: &Request) -> String {
        let mut hasher = Sha256::new();
        hasher.update(request.cache_key().as_bytes());
        hex::encode(hasher.finalize())
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn body_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", key))
    }

    async fn read_meta(path: &Path) -> Result<Option<EntryMeta>> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn remove_entry(&self, key: &str) {
        // Ignore errors; a half-removed entry is treated as a miss next time.
        let _ = fs::remove_file(self.meta_path(key)).await;
        let _ = fs::remove_file(self.body_path(key)).await;
    }
}

#[async_trait]
impl Cache for FileCache {
    async fn match_request(&self, request: &Request) -> Result<Option<Response>> {
        let key = Self::entry_key(request);
        let meta = match Self::read_meta(&self.meta_path(&key)).await? {
            Some(meta) => meta,
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(cache = %self.name, url = %request.url, "Cache miss");
                return Ok(None);
            }
        };

        match fs::read(self.body_path(&key)).await {
            Ok(body) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(cache = %self.name, url = %request.url, "Cache hit");
                Ok(Some(Response {
                    status: meta.status,
                    headers: meta.headers,
                    body,
                }))
            }
            Err(err) => {
                warn!(cache = %self.name, url = %request.url, error = %err,
                    "Failed to read cached body, removing entry");
                self.remove_entry(&key).await;
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn put(&self, request: &Request, response: Response) -> Result<()> {
        let key = Self::entry_key(request);
        let meta = EntryMeta {
            request: request.clone(),
            status: response.status,
            headers: response.headers,
            size: response.body.len() as u64,
            cached_at: Utc::now(),
        };

        // Body first; the metadata file marks the entry as complete.
        fs::write(self.body_path(&key), &response.body).await?;
        fs::write(self.meta_path(&key), serde_json::to_vec(&meta)?).await?;

        debug!(cache = %self.name, url = %request.url, size = meta.size, "Cached entry");
        Ok(())
    }

    async fn delete(&self, request: &Request) -> Result<bool> {
        let key = Self::entry_key(request);
        let existed = match fs::remove_file(self.meta_path(&key)).await {
            Ok(()) => true,
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => return Err(err.into()),
        };
        let _ = fs::remove_file(self.body_path(&key)).await;
        Ok(existed)
    }

    async fn keys(&self) -> Result<Vec<Request>> {
        let mut requests = Vec::new();
        let mut dir = fs::read_dir(&self.dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_meta(&path).await {
                Ok(Some(meta)) => requests.push(meta.request),
                Ok(None) => {}
                Err(err) => {
                    warn!(cache = %self.name, path = ?path, error = %err,
                        "Skipping unreadable cache entry");
                }
            }
        }
        Ok(requests)
    }

    async fn stats(&self) -> Result<CacheStats> {
        let mut entries = 0;
        let mut total_size = 0;
        let mut dir = fs::read_dir(&self.dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Ok(Some(meta)) = Self::read_meta(&path).await {
                entries += 1;
                total_size += meta.size;
            }
        }
        Ok(CacheStats {
            entries,
            total_size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_and_match_round_trip() {
        let dir = tempdir().unwrap();
        let storage = FileCacheStorage::new(dir.path());
        storage.init().await.unwrap();

        let cache = storage.open("app-cache-v1").await.unwrap();
        let request = Request::get("/").with_header("accept", "text/html");
        let response = Response::new(200)
            .with_header("content-type", "text/html")
            .with_body("<html></html>");

        cache.put(&request, response.clone()).await.unwrap();

        let found = cache.match_request(&request).await.unwrap().unwrap();
        assert_eq!(found, response);
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let request = Request::get("/static/style.css");
        let response = Response::new(200).with_body("body { margin: 0 }");

        {
            let storage = FileCacheStorage::new(dir.path());
            storage.init().await.unwrap();
            let cache = storage.open("app-cache-v1").await.unwrap();
            cache.put(&request, response.clone()).await.unwrap();
        }

        // A fresh storage over the same directory still serves the entry.
        let storage = FileCacheStorage::new(dir.path());
        let cache = storage.open("app-cache-v1").await.unwrap();
        let found = cache.match_request(&request).await.unwrap();
        assert_eq!(found, Some(response));
    }

    #[tokio::test]
    async fn test_names_and_delete_cache() {
        let dir = tempdir().unwrap();
        let storage = FileCacheStorage::new(dir.path());
        storage.init().await.unwrap();

        storage.open("app-cache-v1").await.unwrap();
        storage.open("app-cache-v2").await.unwrap();
        assert_eq!(
            storage.names().await.unwrap(),
            vec!["app-cache-v1", "app-cache-v2"]
        );

        assert!(storage.delete("app-cache-v1").await.unwrap());
        assert!(!storage.delete("app-cache-v1").await.unwrap());
        assert_eq!(storage.names().await.unwrap(), vec!["app-cache-v2"]);
    }

    #[tokio::test]
    async fn test_names_on_missing_root() {
        let dir = tempdir().unwrap();
        let storage = FileCacheStorage::new(dir.path().join("never-created"));
        assert!(storage.names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_keys_lists_stored_requests() {
        let dir = tempdir().unwrap();
        let storage = FileCacheStorage::new(dir.path());
        storage.init().await.unwrap();

        let cache = storage.open("app-cache-v1").await.unwrap();
        cache
            .put(&Request::get("/"), Response::new(200))
            .await
            .unwrap();
        cache
            .put(&Request::get("/static/offline.html"), Response::new(200))
            .await
            .unwrap();

        let mut urls: Vec<String> = cache
            .keys()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.url)
            .collect();
        urls.sort();
        assert_eq!(urls, vec!["/", "/static/offline.html"]);
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let dir = tempdir().unwrap();
        let storage = FileCacheStorage::new(dir.path());
        storage.init().await.unwrap();

        let cache = storage.open("app-cache-v1").await.unwrap();
        let request = Request::get("/");
        cache.put(&request, Response::new(200)).await.unwrap();

        assert!(cache.delete(&request).await.unwrap());
        assert!(!cache.delete(&request).await.unwrap());
        assert!(cache.match_request(&request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats_counts_entries_and_size() {
        let dir = tempdir().unwrap();
        let storage = FileCacheStorage::new(dir.path());
        storage.init().await.unwrap();

        let cache = storage.open("app-cache-v1").await.unwrap();
        cache
            .put(&Request::get("/"), Response::new(200).with_body("hello"))
            .await
            .unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.total_size, 5);
    }
}
