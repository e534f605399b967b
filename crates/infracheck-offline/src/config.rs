//! Worker configuration

/// Current cache generation; bumped at deploy time to invalidate the shell.
const CACHE_VERSION: &str = "v1.0.0";

/// Prefix shared by every generation's cache name.
const CACHE_PREFIX: &str = "infracheck-cache-";

/// Fallback document served when a document fetch fails with nothing cached.
const OFFLINE_PAGE: &str = "/static/offline.html";

/// Resources provisioned eagerly at install so the app can render offline.
const APP_SHELL: [&str; 6] = [
    "/",
    "/static/style.css",
    "/static/manifest.json",
    "/static/icons/icon-192.png",
    "/static/icons/icon-512.png",
    "/static/offline.html",
];

/// Configuration for the offline worker.
///
/// The version tag namespaces the cache store and drives eviction: at
/// activation every cache whose name does not match `cache_name()` is
/// deleted.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Prefix for versioned cache names
    pub cache_prefix: String,
    /// Cache generation this worker serves
    pub version: String,
    /// Resources cached at install
    pub app_shell: Vec<String>,
    /// Path of the offline fallback document
    pub offline_page: String,
}

impl WorkerConfig {
    /// Name of the cache store for the current generation.
    pub fn cache_name(&self) -> String {
        format!("{}{}", self.cache_prefix, self.version)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_prefix: CACHE_PREFIX.to_string(),
            version: CACHE_VERSION.to_string(),
            app_shell: APP_SHELL.iter().map(|p| p.to_string()).collect(),
            offline_page: OFFLINE_PAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_name_combines_prefix_and_version() {
        let config = WorkerConfig::default();
        assert_eq!(config.cache_name(), "infracheck-cache-v1.0.0");

        let bumped = WorkerConfig {
            version: "v1.1.0".to_string(),
            ..WorkerConfig::default()
        };
        assert_eq!(bumped.cache_name(), "infracheck-cache-v1.1.0");
    }

    #[test]
    fn test_default_shell_includes_offline_page() {
        let config = WorkerConfig::default();
        assert!(config.app_shell.contains(&config.offline_page));
    }
}
