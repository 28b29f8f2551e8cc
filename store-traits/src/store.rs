//! Object-storage capability
//!
//! Container and object operations against a remote object store, expressed
//! as a single abstract interface so the sync engine depends only on the
//! capability and never on a concrete backend driver.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::error::Result;

/// A single object in a container listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub name: String,
    pub size: Option<u64>,
}

/// One authenticated session against a remote object store.
///
/// Listings are eventually consistent: an object written moments ago may not
/// appear yet. Callers that derive deletions from a listing must union it
/// with the names they just wrote.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Get or create the named container.
    async fn ensure_container(&self, container: &str) -> Result<()>;

    /// List the objects currently in the container.
    async fn list_objects(&self, container: &str) -> Result<Vec<ObjectEntry>>;

    /// Read an entire object into memory.
    ///
    /// Returns `ObjectNotFound` when the object does not exist.
    async fn get_object(&self, container: &str, name: &str) -> Result<Bytes>;

    /// Write an object from an in-memory buffer, replacing any previous one.
    async fn put_object(&self, container: &str, name: &str, data: Bytes) -> Result<()>;

    /// Write an object from a byte stream, replacing any previous one.
    async fn put_object_stream(
        &self,
        container: &str,
        name: &str,
        body: Box<dyn tokio::io::AsyncRead + Send + Unpin>,
        size: Option<u64>,
    ) -> Result<()>;

    /// Delete an object.
    ///
    /// Returns `ObjectNotFound` when the object was already gone; callers
    /// decide whether that is an error.
    async fn delete_object(&self, container: &str, name: &str) -> Result<()>;

    /// Enable CDN / static-website serving for the container and return its
    /// public URL.
    async fn enable_cdn(&self, container: &str) -> Result<String>;
}

/// Opens store sessions.
///
/// Backend drivers are not assumed to be safe to share across concurrent
/// transfer tasks, so every task asks the factory for its own session.
#[async_trait]
pub trait StoreFactory: Send + Sync {
    /// Open a fresh, independently authenticated session.
    async fn connect(&self) -> Result<Arc<dyn ObjectStore>>;
}
