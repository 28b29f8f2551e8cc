//! Upload-side synchronization engine.
//!
//! Pushes a local folder of artifacts into a remote container and brings the
//! metadata manifest and HTML index in line with the container contents.
//! The whole operation is retried on transient failures; credential
//! failures are terminal.

use bytes::Bytes;
use core_artifact::{matching_dev_filenames, stamp_if_dev, FilenameCodec, PythonVersion};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use store_traits::store::{ObjectStore, StoreFactory};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SyncError};
use crate::index::{is_derived_object, render_index, INDEX_OBJECT};
use crate::manifest::{ArtifactMetadataEntry, RemoteManifest, MANIFEST_OBJECT};

/// Upload engine configuration.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Maximum concurrent uploads.
    pub max_workers: usize,

    /// Total attempts for the whole operation (first try included).
    pub retry_attempts: u32,

    /// Delay between attempts.
    pub retry_delay: Duration,

    /// Regenerate the HTML index after a successful sync.
    pub update_index: bool,

    /// Enable CDN / static-website serving after a successful sync.
    pub enable_cdn: bool,

    /// Delete superseded dev builds after uploading a newer one.
    pub prune_dev_builds: bool,

    /// How many dev builds to keep per build slot, newest first.
    pub keep_dev_builds: usize,

    /// Interpreter version substituted for version-less tags.
    pub host_python: PythonVersion,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
            update_index: true,
            enable_cdn: true,
            prune_dev_builds: true,
            keep_dev_builds: 5,
            host_python: PythonVersion::default(),
        }
    }
}

/// One local file scheduled for upload.
#[derive(Debug, Clone)]
struct LocalArtifact {
    path: PathBuf,
    filename: String,
    entry: ArtifactMetadataEntry,
}

/// Upload-side sync engine.
pub struct Uploader {
    config: UploadConfig,
    factory: Arc<dyn StoreFactory>,
    codec: Arc<FilenameCodec>,
}

impl Uploader {
    pub fn new(config: UploadConfig, factory: Arc<dyn StoreFactory>) -> Self {
        let codec = Arc::new(FilenameCodec::new(config.host_python));
        Self {
            config,
            factory,
            codec,
        }
    }

    /// Synchronize `local_folder` into `container`.
    ///
    /// Any non-credential failure restarts the whole operation, up to the
    /// configured attempt budget. Re-running is idempotent: re-uploading an
    /// already-uploaded file is safe and stamped files are never re-stamped.
    #[instrument(skip(self), fields(container = %container))]
    pub async fn upload(&self, local_folder: &Path, container: &str) -> Result<()> {
        let mut attempt = 1u32;
        loop {
            match self.try_upload(local_folder, container).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_terminal() => return Err(err),
                Err(err) => {
                    if attempt >= self.config.retry_attempts {
                        return Err(err);
                    }
                    warn!(attempt, error = %err, "sync attempt failed, retrying");
                    attempt += 1;
                    sleep(self.config.retry_delay).await;
                }
            }
        }
    }

    async fn try_upload(&self, local_folder: &Path, container: &str) -> Result<()> {
        let store = self.factory.connect().await?;
        store.ensure_container(container).await?;

        let local = self.scan_local_folder(local_folder).await?;
        info!(
            count = local.len(),
            folder = %local_folder.display(),
            "collected local artifacts"
        );

        self.transfer(container, &local).await?;

        let uploaded: BTreeSet<String> = local.iter().map(|a| a.filename.clone()).collect();
        let manifest = self
            .refresh_manifest(store.as_ref(), container, &local, &uploaded)
            .await?;

        if self.config.update_index {
            self.render_and_upload_index(store.as_ref(), container, &manifest, &uploaded)
                .await?;
        }

        if self.config.enable_cdn {
            let url = store.enable_cdn(container).await?;
            info!(url = %url, "container CDN enabled");
        }

        Ok(())
    }

    /// Enumerate the folder in sorted order, stamp dev wheels (renaming on
    /// disk) and compute per-file metadata. Entries whose filename does not
    /// parse as an artifact are logged and skipped.
    async fn scan_local_folder(&self, folder: &Path) -> Result<Vec<LocalArtifact>> {
        let mut names = Vec::new();
        let mut dir = fs::read_dir(folder).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            if entry.file_type().await?.is_dir() {
                continue;
            }
            names.push(name);
        }
        names.sort();

        let mut artifacts = Vec::new();
        for name in names {
            let outcome = match stamp_if_dev(&self.codec, &name) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(file = %name, error = %err, "skipping unrecognized local file");
                    continue;
                }
            };
            let path = folder.join(&outcome.filename);
            if outcome.renamed {
                info!(from = %name, to = %outcome.filename, "stamped dev build");
                fs::rename(folder.join(&name), &path).await?;
            }
            let entry = digest_file(&path).await?;
            artifacts.push(LocalArtifact {
                path,
                filename: outcome.filename,
                entry,
            });
        }
        Ok(artifacts)
    }

    /// Upload all artifacts concurrently, bounded by the worker limit.
    ///
    /// Every task opens its own store session. The first error is raised
    /// only after every dispatched task has been awaited; siblings are not
    /// cancelled, so partial uploads are possible and tolerated by the
    /// retry wrapper.
    async fn transfer(&self, container: &str, local: &[LocalArtifact]) -> Result<()> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let retention = self
            .config
            .prune_dev_builds
            .then_some(self.config.keep_dev_builds);

        let mut tasks = JoinSet::new();
        for artifact in local.iter().cloned() {
            let semaphore = semaphore.clone();
            let factory = self.factory.clone();
            let codec = self.codec.clone();
            let container = container.to_string();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| SyncError::Join("semaphore closed".to_string()))?;
                upload_one(factory, &container, &artifact, &codec, retention).await
            });
        }

        let mut first_error: Option<SyncError> = None;
        while let Some(joined) = tasks.join_next().await {
            let result = joined.unwrap_or_else(|e| Err(SyncError::Join(e.to_string())));
            if let Err(err) = result {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Merge this run's metadata into the remote manifest, garbage-collect
    /// entries for objects that no longer exist and upload the result.
    async fn refresh_manifest(
        &self,
        store: &dyn ObjectStore,
        container: &str,
        local: &[LocalArtifact],
        uploaded: &BTreeSet<String>,
    ) -> Result<RemoteManifest> {
        let mut manifest = match store.get_object(container, MANIFEST_OBJECT).await {
            Ok(bytes) => RemoteManifest::decode(&bytes)?,
            Err(err) if err.is_not_found() => RemoteManifest::default(),
            Err(err) => return Err(err.into()),
        };
        manifest.merge(
            local
                .iter()
                .map(|a| (a.filename.clone(), a.entry.clone())),
        );

        let known = self.known_objects(store, container, uploaded).await?;
        manifest.retain_known(&known);

        info!(entries = manifest.len(), "uploading {}", MANIFEST_OBJECT);
        store
            .put_object(container, MANIFEST_OBJECT, Bytes::from(manifest.encode()?))
            .await?;
        Ok(manifest)
    }

    async fn render_and_upload_index(
        &self,
        store: &dyn ObjectStore,
        container: &str,
        manifest: &RemoteManifest,
        uploaded: &BTreeSet<String>,
    ) -> Result<()> {
        let known = self.known_objects(store, container, uploaded).await?;
        let links = known.iter().filter(|n| !is_derived_object(n)).count();
        info!(links, "updating {}", INDEX_OBJECT);
        let payload = render_index(&known, manifest);
        store
            .put_object(container, INDEX_OBJECT, Bytes::from(payload))
            .await?;
        Ok(())
    }

    /// Container listing unioned with the names uploaded by this run:
    /// listings are eventually consistent and may lag our own writes.
    async fn known_objects(
        &self,
        store: &dyn ObjectStore,
        container: &str,
        uploaded: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>> {
        let mut known: BTreeSet<String> = store
            .list_objects(container)
            .await?
            .into_iter()
            .map(|o| o.name)
            .collect();
        known.extend(uploaded.iter().cloned());
        Ok(known)
    }
}

/// Upload one artifact through a fresh store session, then prune the dev
/// builds it supersedes.
async fn upload_one(
    factory: Arc<dyn StoreFactory>,
    container: &str,
    artifact: &LocalArtifact,
    codec: &FilenameCodec,
    retention: Option<usize>,
) -> Result<()> {
    let store = factory.connect().await?;
    info!(
        file = %artifact.path.display(),
        size = artifact.entry.size,
        "uploading"
    );
    let file = fs::File::open(&artifact.path).await?;
    store
        .put_object_stream(
            container,
            &artifact.filename,
            Box::new(file),
            Some(artifact.entry.size),
        )
        .await?;

    if let Some(keep) = retention {
        prune_superseded_dev_builds(store.as_ref(), container, &artifact.filename, codec, keep)
            .await?;
    }
    Ok(())
}

/// Delete dev builds sharing the uploaded file's build slot beyond the
/// newest `keep`.
async fn prune_superseded_dev_builds(
    store: &dyn ObjectStore,
    container: &str,
    filename: &str,
    codec: &FilenameCodec,
    keep: usize,
) -> Result<()> {
    let Ok(descriptor) = codec.parse(filename, None) else {
        return Ok(());
    };
    if !codec.versions().is_development(&descriptor.version) {
        return Ok(());
    }

    let mut existing: BTreeSet<String> = store
        .list_objects(container)
        .await?
        .into_iter()
        .map(|o| o.name)
        .collect();
    // The listing may not include the object we just wrote.
    existing.insert(filename.to_string());
    let names: Vec<String> = existing.into_iter().collect();

    let matching = matching_dev_filenames(codec, filename, &names);
    for outdated in matching.iter().skip(keep) {
        info!(file = %outdated, "pruning superseded dev build");
        match store.delete_object(container, outdated).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                debug!(file = %outdated, "already deleted");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// SHA-256 digest and byte size of a file, read in chunks.
async fn digest_file(path: &Path) -> Result<ArtifactMetadataEntry> {
    let mut file = fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    let mut size = 0u64;
    loop {
        let read = file.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
        size += read as u64;
    }
    Ok(ArtifactMetadataEntry {
        sha256: hex::encode(hasher.finalize()),
        size,
    })
}
