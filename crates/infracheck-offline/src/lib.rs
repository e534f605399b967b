//! Offline cache manager for the Infracheck PWA
//!
//! Provisions the app shell into a versioned cache at install time, sweeps
//! stale cache generations at activation, and answers intercepted requests
//! with a network-first strategy for documents and a cache-first strategy
//! for static assets. The core has no event-loop dependency: a host adapter
//! invokes the three lifecycle operations and supplies the cache storage and
//! network implementations.

pub mod config;
pub mod error;
pub mod fetch;
pub mod worker;

pub use config::WorkerConfig;
pub use error::{FetchError, Result, WorkerError};
pub use fetch::{Fetch, HttpFetcher};
pub use worker::OfflineWorker;
