//! Network access for the offline worker

use crate::error::FetchError;
use async_trait::async_trait;
use request_cache::{Method, Request, Response};
use std::time::Duration;
use tracing::debug;

/// A single network attempt for an intercepted request.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Issue the request over the network.
    ///
    /// Any HTTP response, including 4xx/5xx, resolves to `Ok`; only
    /// transport failure (offline, DNS, connect, timeout) is an error.
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// reqwest-backed fetcher resolving site-relative paths against an origin.
///
/// Clone is cheap: `reqwest::Client` shares its connection pool internally.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    origin: String,
}

impl HttpFetcher {
    /// Default request timeout. 30s fails fast enough while allowing for
    /// slow first-visit responses.
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a fetcher for the given origin (e.g. `https://infracheck.example`).
    pub fn new(origin: impl Into<String>) -> Self {
        Self::with_timeout(origin, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(origin: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolve site-relative paths against the configured origin; absolute
    /// URLs pass through untouched.
    fn resolve(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.origin, url)
        } else {
            url.to_string()
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Patch => reqwest::Method::PATCH,
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let url = self.resolve(&request.url);
        debug!(url = %url, method = request.method.as_str(), "Fetching");

        let mut builder = self.client.request(to_reqwest_method(request.method), &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let mut headers = std::collections::HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }

        let body = response.bytes().await?.to_vec();
        debug!(url = %url, status, size = body.len(), "Fetched");

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
