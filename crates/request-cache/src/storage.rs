//! Cache store traits
//!
//! The worker only ever talks to these traits; which backend sits behind
//! them is the host adapter's choice.

use crate::error::Result;
use crate::types::{CacheStats, Request, Response};
use async_trait::async_trait;
use std::sync::Arc;

/// A single named cache of request/response pairs.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Exact-match lookup of a previously stored response.
    async fn match_request(&self, request: &Request) -> Result<Option<Response>>;

    /// Store a response under the request's key, replacing any existing entry.
    async fn put(&self, request: &Request, response: Response) -> Result<()>;

    /// Remove the entry for this request. Returns whether an entry existed.
    async fn delete(&self, request: &Request) -> Result<bool>;

    /// The requests currently stored in this cache.
    async fn keys(&self) -> Result<Vec<Request>>;

    /// Current statistics for this cache.
    async fn stats(&self) -> Result<CacheStats>;
}

/// A collection of named caches, opened lazily and deleted wholesale.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the cache with this name, creating it if absent.
    async fn open(&self, name: &str) -> Result<Arc<dyn Cache>>;

    /// Names of all existing caches.
    async fn names(&self) -> Result<Vec<String>>;

    /// Delete an entire cache by name. Returns whether it existed.
    async fn delete(&self, name: &str) -> Result<bool>;
}
