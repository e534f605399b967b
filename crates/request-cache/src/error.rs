//! Error types for the cache stores

use std::fmt;

#[derive(Debug)]
pub enum CacheStoreError {
    Io(Box<std::io::Error>),
    Metadata(serde_json::Error),
}

impl fmt::Display for CacheStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStoreError::Io(err) => write!(f, "cache I/O error: {}", err),
            CacheStoreError::Metadata(err) => write!(f, "cache metadata error: {}", err),
        }
    }
}

impl std::error::Error for CacheStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheStoreError::Io(err) => Some(err.as_ref()),
            CacheStoreError::Metadata(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CacheStoreError {
    fn from(err: std::io::Error) -> Self {
        CacheStoreError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for CacheStoreError {
    fn from(err: serde_json::Error) -> Self {
        CacheStoreError::Metadata(err)
    }
}

pub type Result<T> = std::result::Result<T, CacheStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = CacheStoreError::Io(Box::new(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        )));
        assert!(format!("{}", err).contains("no such file"));
    }

    #[test]
    fn test_error_is_debug() {
        let err = CacheStoreError::Io(Box::new(std::io::Error::other("disk full")));
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Io"));
    }
}
