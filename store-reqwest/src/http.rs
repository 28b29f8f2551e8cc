//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use store_traits::{
    error::{Result, StoreError},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use tracing::debug;

/// Reqwest-based HTTP client implementation
///
/// Provides HTTP operations with:
/// - Connection pooling via reqwest
/// - TLS by default, with an explicit insecure opt-out
/// - Async streaming in both directions
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Self {
        Self::with_options(Duration::from_secs(60), false)
    }

    /// Create a new HTTP client without TLS certificate verification
    pub fn insecure() -> Self {
        Self::with_options(Duration::from_secs(60), true)
    }

    /// Create a new HTTP client with custom timeout and TLS behavior
    pub fn with_options(timeout: Duration, insecure: bool) -> Self {
        let mut builder = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent("wheelhouse/0.1.0");

        if insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().expect("Failed to build HTTP client");

        Self { client }
    }

    /// Create a new HTTP client from a preconfigured reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn convert_response_headers(response: &reqwest::Response) -> HashMap<String, String> {
        response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect()
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(url = %request.url, "Executing HTTP request");

        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(|e| StoreError::Transfer(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = Self::convert_response_headers(&response);
        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Transfer(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    async fn download_stream(
        &self,
        url: String,
    ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Transfer(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Transfer(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        use futures_util::TryStreamExt;
        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let reader = tokio_util::io::StreamReader::new(stream);

        Ok(Box::new(reader))
    }

    async fn put_stream(
        &self,
        url: String,
        headers: HashMap<String, String>,
        body: Box<dyn tokio::io::AsyncRead + Send + Unpin>,
        content_length: Option<u64>,
    ) -> Result<HttpResponse> {
        let stream = tokio_util::io::ReaderStream::new(body);
        let mut req = self
            .client
            .put(&url)
            .body(reqwest::Body::wrap_stream(stream));

        for (key, value) in headers {
            req = req.header(key, value);
        }

        if let Some(length) = content_length {
            req = req.header(reqwest::header::CONTENT_LENGTH, length);
        }

        let response = req
            .send()
            .await
            .map_err(|e| StoreError::Transfer(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = Self::convert_response_headers(&response);
        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Transfer(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
