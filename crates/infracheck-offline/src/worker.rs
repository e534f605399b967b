//! Lifecycle operations and request strategies
//!
//! The worker is driven by a host adapter through three operations:
//! `handle_install` once when a new version is registered, `handle_activate`
//! once the new version takes control, and `handle_fetch` per intercepted
//! request.

use crate::config::WorkerConfig;
use crate::error::{Result, WorkerError};
use crate::fetch::Fetch;
use request_cache::{Cache, CacheStorage, Request, Response};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// MIME token that classifies a request as a document fetch.
const HTML_MIME: &str = "text/html";

/// A request is a document fetch when its Accept header carries the HTML token.
fn is_document(request: &Request) -> bool {
    request
        .header("accept")
        .map(|accept| accept.contains(HTML_MIME))
        .unwrap_or(false)
}

/// The offline cache manager.
///
/// Holds the versioned cache configuration and the storage and network
/// implementations supplied by the host adapter.
pub struct OfflineWorker {
    config: WorkerConfig,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetch>,
}

impl OfflineWorker {
    pub fn new(
        config: WorkerConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetch>,
    ) -> Self {
        Self {
            config,
            storage,
            fetcher,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    async fn open_current(&self) -> Result<Arc<dyn Cache>> {
        Ok(self.storage.open(&self.config.cache_name()).await?)
    }

    /// Provision the app shell into the current generation's cache.
    ///
    /// Population is all-or-nothing: every shell resource is fetched before
    /// anything is written, and a transport failure or non-success status for
    /// any of them aborts the install with the cache left empty. On success
    /// the host adapter should promote this version immediately instead of
    /// waiting for existing clients to release the previous one.
    pub async fn handle_install(&self) -> Result<()> {
        let cache_name = self.config.cache_name();
        let cache = self.storage.open(&cache_name).await?;

        let mut shell = Vec::with_capacity(self.config.app_shell.len());
        for path in &self.config.app_shell {
            let request = Request::get(path);
            let response = self.fetcher.fetch(&request).await?;
            if !response.is_success() {
                return Err(WorkerError::Install(format!(
                    "app shell resource {} returned status {}",
                    path, response.status
                )));
            }
            shell.push((request, response));
        }

        for (request, response) in shell {
            cache.put(&request, response).await?;
        }

        info!(cache = %cache_name, resources = self.config.app_shell.len(), "App shell installed");
        Ok(())
    }

    /// Sweep cache generations that no longer match the current version.
    ///
    /// Afterwards at most one cache, the current generation's, remains. The
    /// host adapter should then take control of open clients without waiting
    /// for a reload.
    pub async fn handle_activate(&self) -> Result<()> {
        let current = self.config.cache_name();
        for name in self.storage.names().await? {
            if name != current {
                self.storage.delete(&name).await?;
                debug!(cache = %name, "Swept stale cache generation");
            }
        }
        info!(cache = %current, "Worker activated");
        Ok(())
    }

    /// Answer an intercepted request.
    ///
    /// Documents (HTML-accepting requests) go network-first; everything else
    /// is treated as a static asset and goes cache-first. Always produces an
    /// explicit response or error, never a pass-through.
    pub async fn handle_fetch(&self, request: Request) -> Result<Response> {
        if is_document(&request) {
            self.network_first(request).await
        } else {
            self.cache_first(request).await
        }
    }

    async fn network_first(&self, request: Request) -> Result<Response> {
        match self.fetcher.fetch(&request).await {
            Ok(response) => {
                self.store_in_background(request, response.clone());
                Ok(response)
            }
            Err(err) => {
                warn!(url = %request.url, error = %err, "Document fetch failed, falling back to cache");
                let cache = self.open_current().await?;
                if let Some(cached) = cache.match_request(&request).await? {
                    return Ok(cached);
                }
                let offline = Request::get(&self.config.offline_page);
                if let Some(page) = cache.match_request(&offline).await? {
                    return Ok(page);
                }
                // Nothing cached and no offline page: the failure surfaces.
                Err(WorkerError::Fetch(err))
            }
        }
    }

    async fn cache_first(&self, request: Request) -> Result<Response> {
        let cache = self.open_current().await?;
        if let Some(cached) = cache.match_request(&request).await? {
            return Ok(cached);
        }
        // Assets outside the app shell are served but never cached here.
        Ok(self.fetcher.fetch(&request).await?)
    }

    /// Best-effort write of a fresh document into the current cache.
    ///
    /// The task is detached on purpose: a failed write costs at most one
    /// extra network round trip later and must not delay the response.
    fn store_in_background(&self, request: Request, response: Response) {
        let storage = Arc::clone(&self.storage);
        let cache_name = self.config.cache_name();
        tokio::spawn(async move {
            let cache = match storage.open(&cache_name).await {
                Ok(cache) => cache,
                Err(err) => {
                    debug!(cache = %cache_name, error = %err, "Background cache open failed");
                    return;
                }
            };
            if let Err(err) = cache.put(&request, response).await {
                debug!(url = %request.url, error = %err, "Background cache write failed");
            }
        });
    }
}
