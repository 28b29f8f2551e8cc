//! Integration tests for the upload path
//!
//! These tests drive the full upload pipeline against an in-memory object
//! store: stamping, concurrent transfer, manifest refresh and garbage
//! collection, index rendering and dev-build retention.

use async_trait::async_trait;
use bytes::Bytes;
use core_artifact::{FilenameCodec, PythonVersion};
use core_sync::{RemoteManifest, UploadConfig, Uploader, INDEX_OBJECT, MANIFEST_OBJECT};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use store_traits::store::{ObjectEntry, ObjectStore, StoreFactory};
use store_traits::StoreError;
use tokio::io::AsyncReadExt;

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
struct MemoryState {
    containers: BTreeMap<String, BTreeMap<String, Bytes>>,
}

/// Object store backed by a shared in-memory map. The factory hands out
/// clones sharing the same state, mimicking independent sessions against
/// one remote container.
#[derive(Clone, Default)]
struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    fn new() -> Self {
        Self::default()
    }

    fn seed_object(&self, container: &str, name: &str, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state
            .containers
            .entry(container.to_string())
            .or_default()
            .insert(name.to_string(), Bytes::copy_from_slice(data));
    }

    fn object_names(&self, container: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .containers
            .get(container)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn object(&self, container: &str, name: &str) -> Option<Bytes> {
        let state = self.state.lock().unwrap();
        state.containers.get(container)?.get(name).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn ensure_container(&self, container: &str) -> store_traits::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.containers.entry(container.to_string()).or_default();
        Ok(())
    }

    async fn list_objects(&self, container: &str) -> store_traits::Result<Vec<ObjectEntry>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .containers
            .get(container)
            .map(|objects| {
                objects
                    .iter()
                    .map(|(name, data)| ObjectEntry {
                        name: name.clone(),
                        size: Some(data.len() as u64),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_object(&self, container: &str, name: &str) -> store_traits::Result<Bytes> {
        self.object(container, name)
            .ok_or_else(|| StoreError::ObjectNotFound {
                name: name.to_string(),
            })
    }

    async fn put_object(
        &self,
        container: &str,
        name: &str,
        data: Bytes,
    ) -> store_traits::Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .containers
            .entry(container.to_string())
            .or_default()
            .insert(name.to_string(), data);
        Ok(())
    }

    async fn put_object_stream(
        &self,
        container: &str,
        name: &str,
        mut body: Box<dyn tokio::io::AsyncRead + Send + Unpin>,
        _size: Option<u64>,
    ) -> store_traits::Result<()> {
        let mut data = Vec::new();
        body.read_to_end(&mut data).await?;
        self.put_object(container, name, Bytes::from(data)).await
    }

    async fn delete_object(&self, container: &str, name: &str) -> store_traits::Result<()> {
        let mut state = self.state.lock().unwrap();
        let removed = state
            .containers
            .get_mut(container)
            .and_then(|objects| objects.remove(name));
        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::ObjectNotFound {
                name: name.to_string(),
            }),
        }
    }

    async fn enable_cdn(&self, container: &str) -> store_traits::Result<String> {
        Ok(format!("https://cdn.example.org/{container}"))
    }
}

#[async_trait]
impl StoreFactory for MemoryStore {
    async fn connect(&self) -> store_traits::Result<Arc<dyn ObjectStore>> {
        Ok(Arc::new(self.clone()))
    }
}

/// Factory failing every connect with a configurable error.
struct FailingFactory {
    make_error: fn() -> StoreError,
    attempts: Arc<Mutex<usize>>,
}

#[async_trait]
impl StoreFactory for FailingFactory {
    async fn connect(&self) -> store_traits::Result<Arc<dyn ObjectStore>> {
        *self.attempts.lock().unwrap() += 1;
        Err((self.make_error)())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn test_config() -> UploadConfig {
    UploadConfig {
        retry_delay: Duration::from_millis(0),
        enable_cdn: false,
        host_python: PythonVersion::new(3, 12),
        ..UploadConfig::default()
    }
}

fn write_file(folder: &Path, name: &str, data: &[u8]) {
    std::fs::write(folder.join(name), data).unwrap();
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_upload_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "demo-0.1-py2.py3-none-any.whl", b"release bytes");
    write_file(dir.path(), "demo-0.2.dev0-py2-none-any.whl", b"dev bytes");

    let store = MemoryStore::new();
    let uploader = Uploader::new(test_config(), Arc::new(store.clone()));
    uploader.upload(dir.path(), "wheelhouse").await.unwrap();

    let names = store.object_names("wheelhouse");
    assert_eq!(names.len(), 4, "2 artifacts + manifest + index: {names:?}");
    assert!(names.contains(&"demo-0.1-py2.py3-none-any.whl".to_string()));
    assert!(names.contains(&MANIFEST_OBJECT.to_string()));
    assert!(names.contains(&INDEX_OBJECT.to_string()));

    // The dev wheel was stamped on disk and uploaded under its new name.
    let codec = FilenameCodec::new(PythonVersion::new(3, 12));
    let stamped = names
        .iter()
        .find(|n| n.starts_with("demo-0.2.dev0+"))
        .expect("stamped dev wheel present");
    let descriptor = codec.parse(stamped, None).unwrap();
    assert!(codec
        .versions()
        .has_local_timestamp_segment(&descriptor.version));
    assert!(dir.path().join(stamped).exists());
    assert!(!dir.path().join("demo-0.2.dev0-py2-none-any.whl").exists());

    // Manifest records digest and size for both artifacts.
    let manifest =
        RemoteManifest::decode(&store.object("wheelhouse", MANIFEST_OBJECT).unwrap()).unwrap();
    assert_eq!(manifest.len(), 2);
    let release = manifest.get("demo-0.1-py2.py3-none-any.whl").unwrap();
    assert_eq!(release.sha256, sha256_hex(b"release bytes"));
    assert_eq!(release.size, 13);
    let dev = manifest.get(stamped).unwrap();
    assert_eq!(dev.sha256, sha256_hex(b"dev bytes"));

    // Index lists both artifacts with their digests, nothing else.
    let index = String::from_utf8(
        store.object("wheelhouse", INDEX_OBJECT).unwrap().to_vec(),
    )
    .unwrap();
    assert!(index.contains(&format!(
        "<li><a href=\"demo-0.1-py2.py3-none-any.whl#sha256={}\">demo-0.1-py2.py3-none-any.whl<a></li>",
        sha256_hex(b"release bytes")
    )));
    assert!(index.contains(&format!("{stamped}#sha256=")));
    assert!(!index.contains(MANIFEST_OBJECT));
}

#[tokio::test]
async fn test_upload_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "demo-0.2.dev0-py2-none-any.whl", b"dev bytes");

    let store = MemoryStore::new();
    let uploader = Uploader::new(test_config(), Arc::new(store.clone()));
    uploader.upload(dir.path(), "wheelhouse").await.unwrap();
    let first_names = store.object_names("wheelhouse");

    // A second run re-uploads the already-stamped file without re-stamping.
    uploader.upload(dir.path(), "wheelhouse").await.unwrap();
    assert_eq!(store.object_names("wheelhouse"), first_names);
}

#[tokio::test]
async fn test_retention_prunes_oldest_dev_builds() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "demo-0.2.dev0+20160101000000-py2-none-any.whl",
        b"newest",
    );

    let store = MemoryStore::new();
    for second in 1..=6 {
        store.seed_object(
            "wheelhouse",
            &format!("demo-0.2.dev0+2015010100000{second}-py2-none-any.whl"),
            b"old",
        );
    }

    let config = UploadConfig {
        update_index: false,
        ..test_config()
    };
    let uploader = Uploader::new(config, Arc::new(store.clone()));
    uploader.upload(dir.path(), "wheelhouse").await.unwrap();

    let names = store.object_names("wheelhouse");
    // Exactly the two oldest matching dev builds were deleted.
    assert!(!names.contains(&"demo-0.2.dev0+20150101000001-py2-none-any.whl".to_string()));
    assert!(!names.contains(&"demo-0.2.dev0+20150101000002-py2-none-any.whl".to_string()));
    for second in 3..=6 {
        assert!(names
            .contains(&format!("demo-0.2.dev0+2015010100000{second}-py2-none-any.whl")));
    }
    assert!(names.contains(&"demo-0.2.dev0+20160101000000-py2-none-any.whl".to_string()));
}

#[tokio::test]
async fn test_manifest_garbage_collection() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "demo-1.0.tar.gz", b"fresh");

    let store = MemoryStore::new();
    store.seed_object("wheelhouse", "kept-1.0.tar.gz", b"still there");
    let stale_manifest = br#"{
        "kept-1.0.tar.gz": {"sha256": "aaaa", "size": 11},
        "ghost-1.0.tar.gz": {"sha256": "bbbb", "size": 7}
    }"#;
    store.seed_object("wheelhouse", MANIFEST_OBJECT, stale_manifest);

    let uploader = Uploader::new(test_config(), Arc::new(store.clone()));
    uploader.upload(dir.path(), "wheelhouse").await.unwrap();

    let manifest =
        RemoteManifest::decode(&store.object("wheelhouse", MANIFEST_OBJECT).unwrap()).unwrap();
    // The entry whose object vanished is collected; the one still listed
    // survives untouched; the fresh upload is recorded.
    assert!(manifest.get("ghost-1.0.tar.gz").is_none());
    assert_eq!(manifest.get("kept-1.0.tar.gz").unwrap().sha256, "aaaa");
    assert_eq!(
        manifest.get("demo-1.0.tar.gz").unwrap().sha256,
        sha256_hex(b"fresh")
    );
}

#[tokio::test]
async fn test_unrecognized_local_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "demo-1.0.tar.gz", b"artifact");
    write_file(dir.path(), "README.txt", b"not an artifact");
    write_file(dir.path(), ".hidden", b"dotfile");
    std::fs::create_dir(dir.path().join("subdir")).unwrap();

    let store = MemoryStore::new();
    let uploader = Uploader::new(test_config(), Arc::new(store.clone()));
    uploader.upload(dir.path(), "wheelhouse").await.unwrap();

    let names = store.object_names("wheelhouse");
    assert!(names.contains(&"demo-1.0.tar.gz".to_string()));
    assert!(!names.contains(&"README.txt".to_string()));
    assert!(!names.contains(&".hidden".to_string()));
    assert!(!names.contains(&"subdir".to_string()));
}

#[tokio::test]
async fn test_credential_failure_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let attempts = Arc::new(Mutex::new(0));
    let factory = FailingFactory {
        make_error: || StoreError::InvalidCredentials("key rejected".to_string()),
        attempts: attempts.clone(),
    };

    let uploader = Uploader::new(test_config(), Arc::new(factory));
    let err = uploader.upload(dir.path(), "wheelhouse").await.unwrap_err();

    assert!(err.is_terminal());
    assert_eq!(*attempts.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_transient_failure_exhausts_retry_budget() {
    let dir = tempfile::tempdir().unwrap();
    let attempts = Arc::new(Mutex::new(0));
    let factory = FailingFactory {
        make_error: || StoreError::Transfer("connection reset".to_string()),
        attempts: attempts.clone(),
    };

    let uploader = Uploader::new(test_config(), Arc::new(factory));
    let err = uploader.upload(dir.path(), "wheelhouse").await.unwrap_err();

    assert!(!err.is_terminal());
    assert_eq!(*attempts.lock().unwrap(), 3);
}
