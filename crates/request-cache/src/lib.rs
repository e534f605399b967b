//! Versioned request/response cache stores
//!
//! Models a named, persistent key-value mapping from HTTP requests to stored
//! responses, the way a browser cache store works: caches are opened lazily
//! by name, matched by exact request, and deleted wholesale by name. Two
//! backends are provided: an in-memory store and a file-backed store that
//! survives process restarts.

pub mod error;
pub mod fs;
pub mod memory;
pub mod storage;
pub mod types;

pub use error::{CacheStoreError, Result};
pub use fs::FileCacheStorage;
pub use memory::MemoryCacheStorage;
pub use storage::{Cache, CacheStorage};
pub use types::{CacheStats, Method, Request, Response};
