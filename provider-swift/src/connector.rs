//! Swift API connector implementation
//!
//! Implements the `ObjectStore` capability over the Swift HTTP protocol.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use store_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use store_traits::store::{ObjectEntry, ObjectStore, StoreFactory};
use store_traits::StoreError;
use tracing::{debug, info, instrument};

use crate::error::SwiftError;
use crate::types::SwiftObject;

/// Auth endpoint of the US Cloud Files deployment
const CLOUDFILES_US_AUTH: &str = "https://identity.api.rackspacecloud.com/v1.0";

/// Auth endpoint of the UK Cloud Files deployment
const CLOUDFILES_UK_AUTH: &str = "https://lon.identity.api.rackspacecloud.com/v1.0";

/// Index object advertised to the static-website machinery
const WEB_INDEX_OBJECT: &str = "index.html";

/// Connection settings for a Swift deployment.
#[derive(Debug, Clone)]
pub struct SwiftConfig {
    /// Account name
    pub username: String,

    /// Secret API key
    pub secret: String,

    /// Provider name selecting a known auth endpoint (`CLOUDFILES_US`,
    /// `CLOUDFILES_UK`, `OPENSTACK_SWIFT`)
    pub provider_name: String,

    /// Storage region hint; endpoints that are region-qualified ignore it
    pub region: Option<String>,

    /// Explicit auth endpoint; required for `OPENSTACK_SWIFT`
    pub auth_url: Option<String>,

    /// Skip TLS certificate verification
    pub insecure: bool,
}

/// Factory opening authenticated Swift sessions.
///
/// Each `connect` call builds a fresh HTTP client and re-authenticates, so
/// every concurrent transfer task gets its own independent session.
pub struct SwiftProvider {
    config: SwiftConfig,
    auth_url: String,
}

impl SwiftProvider {
    /// Create a provider, resolving the auth endpoint eagerly so that an
    /// unknown provider name fails before any sync attempt starts.
    pub fn new(config: SwiftConfig) -> crate::error::Result<Self> {
        let auth_url = match config.auth_url.clone() {
            Some(url) => url,
            None => match config.provider_name.as_str() {
                "CLOUDFILES_US" => CLOUDFILES_US_AUTH.to_string(),
                "CLOUDFILES_UK" => CLOUDFILES_UK_AUTH.to_string(),
                other => return Err(SwiftError::UnknownProvider(other.to_string())),
            },
        };
        Ok(Self { config, auth_url })
    }
}

#[async_trait]
impl StoreFactory for SwiftProvider {
    async fn connect(&self) -> store_traits::Result<Arc<dyn ObjectStore>> {
        let http: Arc<dyn HttpClient> = Arc::new(store_reqwest::ReqwestHttpClient::with_options(
            std::time::Duration::from_secs(60),
            self.config.insecure,
        ));
        if let Some(region) = &self.config.region {
            debug!(region = %region, "using storage endpoint announced by the auth service");
        }
        let connector = SwiftConnector::authenticate(
            http,
            &self.auth_url,
            &self.config.username,
            &self.config.secret,
        )
        .await
        .map_err(StoreError::from)?;
        Ok(Arc::new(connector))
    }
}

/// One authenticated Swift session.
pub struct SwiftConnector {
    http: Arc<dyn HttpClient>,
    storage_url: String,
    token: String,
}

impl SwiftConnector {
    /// Authenticate against a v1 auth endpoint and capture the storage URL
    /// and token announced in the response headers.
    #[instrument(skip(http, secret))]
    pub async fn authenticate(
        http: Arc<dyn HttpClient>,
        auth_url: &str,
        username: &str,
        secret: &str,
    ) -> crate::error::Result<Self> {
        let request = HttpRequest::new(HttpMethod::Get, auth_url)
            .header("X-Auth-User", username)
            .header("X-Auth-Key", secret);
        let response = http.execute(request).await?;

        if response.status == 401 || response.status == 403 {
            return Err(SwiftError::AuthenticationFailed(format!(
                "auth endpoint returned status {}",
                response.status
            )));
        }
        if !response.is_success() {
            return Err(SwiftError::ApiError {
                status: response.status,
                message: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        let storage_url = response
            .header("x-storage-url")
            .ok_or_else(|| SwiftError::ParseError("missing X-Storage-Url header".to_string()))?
            .to_string();
        let token = response
            .header("x-auth-token")
            .ok_or_else(|| SwiftError::ParseError("missing X-Auth-Token header".to_string()))?
            .to_string();

        debug!(storage_url = %storage_url, "authenticated");
        Ok(Self {
            http,
            storage_url,
            token,
        })
    }

    fn container_url(&self, container: &str) -> String {
        format!("{}/{}", self.storage_url, urlencoding::encode(container))
    }

    fn object_url(&self, container: &str, name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.storage_url,
            urlencoding::encode(container),
            urlencoding::encode(name)
        )
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url).header("X-Auth-Token", self.token.clone())
    }

    fn auth_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("X-Auth-Token".to_string(), self.token.clone());
        headers
    }

    /// Map an unexpected response status to a store error. An expired or
    /// revoked token surfaces as a credential failure, everything else as a
    /// retryable transfer failure.
    fn status_error(&self, context: &str, response: &HttpResponse) -> StoreError {
        if response.status == 401 {
            StoreError::InvalidCredentials(format!("{}: token rejected", context))
        } else {
            SwiftError::ApiError {
                status: response.status,
                message: format!("{}: {}", context, String::from_utf8_lossy(&response.body)),
            }
            .into()
        }
    }
}

#[async_trait]
impl ObjectStore for SwiftConnector {
    #[instrument(skip(self))]
    async fn ensure_container(&self, container: &str) -> store_traits::Result<()> {
        let request = self.request(HttpMethod::Put, self.container_url(container));
        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(self.status_error("create container", &response));
        }
        debug!(container = %container, "container ready");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_objects(&self, container: &str) -> store_traits::Result<Vec<ObjectEntry>> {
        let mut entries = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut url = format!("{}?format=json", self.container_url(container));
            if let Some(marker) = &marker {
                url.push_str(&format!("&marker={}", urlencoding::encode(marker)));
            }
            let response = self.http.execute(self.request(HttpMethod::Get, url)).await?;
            if !response.is_success() {
                return Err(self.status_error("list container", &response));
            }
            let page: Vec<SwiftObject> = response.json().map_err(|e| {
                StoreError::from(SwiftError::ParseError(format!(
                    "container listing: {}",
                    e
                )))
            })?;
            if page.is_empty() {
                break;
            }
            marker = page.last().map(|o| o.name.clone());
            entries.extend(page.into_iter().map(|o| ObjectEntry {
                name: o.name,
                size: Some(o.bytes),
            }));
        }

        debug!(container = %container, count = entries.len(), "listed objects");
        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn get_object(&self, container: &str, name: &str) -> store_traits::Result<Bytes> {
        let request = self.request(HttpMethod::Get, self.object_url(container, name));
        let response = self.http.execute(request).await?;
        if response.status == 404 {
            return Err(StoreError::ObjectNotFound {
                name: name.to_string(),
            });
        }
        if !response.is_success() {
            return Err(self.status_error("get object", &response));
        }
        Ok(response.body)
    }

    #[instrument(skip(self, data))]
    async fn put_object(&self, container: &str, name: &str, data: Bytes) -> store_traits::Result<()> {
        let request = self
            .request(HttpMethod::Put, self.object_url(container, name))
            .body(data);
        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(self.status_error("put object", &response));
        }
        Ok(())
    }

    #[instrument(skip(self, body))]
    async fn put_object_stream(
        &self,
        container: &str,
        name: &str,
        body: Box<dyn tokio::io::AsyncRead + Send + Unpin>,
        size: Option<u64>,
    ) -> store_traits::Result<()> {
        let response = self
            .http
            .put_stream(
                self.object_url(container, name),
                self.auth_headers(),
                body,
                size,
            )
            .await?;
        if !response.is_success() {
            return Err(self.status_error("put object stream", &response));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_object(&self, container: &str, name: &str) -> store_traits::Result<()> {
        let request = self.request(HttpMethod::Delete, self.object_url(container, name));
        let response = self.http.execute(request).await?;
        if response.status == 404 {
            return Err(StoreError::ObjectNotFound {
                name: name.to_string(),
            });
        }
        if !response.is_success() {
            return Err(self.status_error("delete object", &response));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn enable_cdn(&self, container: &str) -> store_traits::Result<String> {
        let request = self
            .request(HttpMethod::Post, self.container_url(container))
            .header("X-Container-Read", ".r:*")
            .header("X-Container-Meta-Web-Index", WEB_INDEX_OBJECT);
        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(self.status_error("enable cdn", &response));
        }
        let url = self.container_url(container);
        info!(container = %container, url = %url, "container published");
        Ok(url)
    }
}
