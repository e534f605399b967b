//! Error types for the offline worker

use request_cache::CacheStoreError;
use std::fmt;

/// A failed network attempt.
///
/// HTTP responses with error statuses are not errors here; only transport
/// failure is.
#[derive(Debug)]
pub enum FetchError {
    Http(Box<reqwest::Error>),
    Unreachable(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(err) => write!(f, "HTTP error: {}", err),
            FetchError::Unreachable(msg) => write!(f, "network unreachable: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Http(Box::new(err))
    }
}

#[derive(Debug)]
pub enum WorkerError {
    Fetch(FetchError),
    Store(CacheStoreError),
    Install(String),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::Fetch(err) => write!(f, "network fetch failed: {}", err),
            WorkerError::Store(err) => write!(f, "cache store error: {}", err),
            WorkerError::Install(msg) => write!(f, "install failed: {}", msg),
        }
    }
}

impl std::error::Error for WorkerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkerError::Fetch(err) => Some(err),
            WorkerError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FetchError> for WorkerError {
    fn from(err: FetchError) -> Self {
        WorkerError::Fetch(err)
    }
}

impl From<CacheStoreError> for WorkerError {
    fn from(err: CacheStoreError) -> Self {
        WorkerError::Store(err)
    }
}

pub type Result<T> = std::result::Result<T, WorkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_error_display() {
        let err = FetchError::Unreachable("connection refused".to_string());
        assert_eq!(format!("{}", err), "network unreachable: connection refused");
    }

    #[test]
    fn test_install_error_display() {
        let err = WorkerError::Install("missing /static/offline.html".to_string());
        assert_eq!(
            format!("{}", err),
            "install failed: missing /static/offline.html"
        );
    }

    #[test]
    fn test_fetch_error_wraps_into_worker_error() {
        let err: WorkerError = FetchError::Unreachable("offline".to_string()).into();
        assert!(format!("{}", err).contains("offline"));
    }
}
