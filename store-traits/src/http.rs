//! HTTP Client Abstraction
//!
//! Plain async HTTP operations used for index scraping, artifact downloads
//! and the storage protocol itself.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// HTTP response
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Parse response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| StoreError::Transfer(format!("JSON deserialization failed: {}", e)))
    }

    /// Get a response header by its lowercase name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async HTTP client trait
///
/// Implementations should handle TLS, connection pooling and keep-alive.
/// Retries are not an implementation concern: the sync engine retries whole
/// operations, not individual requests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request, buffering the response body.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Download a URL as a stream of bytes.
    ///
    /// This is used for artifact payloads that should not be loaded entirely
    /// into memory.
    async fn download_stream(
        &self,
        url: String,
    ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>>;

    /// PUT a streaming body to a URL.
    ///
    /// `content_length` is forwarded when known; otherwise the transfer is
    /// chunked.
    async fn put_stream(
        &self,
        url: String,
        headers: HashMap<String, String>,
        body: Box<dyn tokio::io::AsyncRead + Send + Unpin>,
        content_length: Option<u64>,
    ) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_request_builder() {
        let request = HttpRequest::new(HttpMethod::Get, "https://example.com")
            .header("X-Auth-Token", "secret")
            .timeout(Duration::from_secs(30));

        assert_eq!(request.url, "https://example.com");
        assert!(request.headers.contains_key("X-Auth-Token"));
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_http_response_status_checks() {
        let response = HttpResponse {
            status: 201,
            headers: HashMap::new(),
            body: Bytes::from("created"),
        };

        assert!(response.is_success());
    }

    #[test]
    fn test_http_response_json() {
        let response = HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(r#"{"name": "pkg-1.0.tar.gz"}"#),
        };

        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["name"], "pkg-1.0.tar.gz");
    }
}
