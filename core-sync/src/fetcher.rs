//! Fetch-side synchronization engine.
//!
//! Downloads artifacts referenced by a remote HTML index into a local
//! folder. Payloads stream into `.part` siblings and are renamed into place
//! only on full success, so an interrupted download never leaves a corrupt
//! file at the final path.

use core_artifact::{FilenameCodec, PythonVersion};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use store_traits::http::{HttpClient, HttpMethod, HttpRequest};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use crate::error::{Result, SyncError};
use crate::scanner::{ArtifactLink, ArtifactLinkScanner};

/// Fetch engine configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum concurrent downloads.
    pub max_workers: usize,

    /// Re-download files that already exist locally.
    pub overwrite: bool,

    /// Interpreter version substituted for version-less tags.
    pub host_python: PythonVersion,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            overwrite: false,
            host_python: PythonVersion::default(),
        }
    }
}

/// Fetch-side sync engine.
pub struct Fetcher {
    config: FetchConfig,
    http: Arc<dyn HttpClient>,
    codec: Arc<FilenameCodec>,
    scanner: ArtifactLinkScanner,
}

impl Fetcher {
    pub fn new(config: FetchConfig, http: Arc<dyn HttpClient>) -> Self {
        let codec = Arc::new(FilenameCodec::new(config.host_python));
        Self {
            config,
            http,
            codec,
            scanner: ArtifactLinkScanner::new(),
        }
    }

    /// Download every artifact of `project_name` (optionally restricted to
    /// `version`) linked from the index page at `index_url` into `folder`.
    ///
    /// Finding no matching artifact is not an error; the versions seen on
    /// the page are logged instead.
    #[instrument(skip(self), fields(index_url = %index_url, project = %project_name))]
    pub async fn fetch_artifacts(
        &self,
        index_url: &str,
        folder: &Path,
        project_name: &str,
        version: Option<&str>,
    ) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Get, index_url);
        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(SyncError::Download {
                url: index_url.to_string(),
                message: format!("index returned status {}", response.status),
            });
        }
        let html = String::from_utf8_lossy(&response.body);

        let outcome = self
            .scanner
            .scan(&html, index_url, &self.codec, project_name, version);
        if outcome.links.is_empty() {
            warn!(
                versions_seen = ?outcome.versions_seen,
                "could not find any matching artifact"
            );
            return Ok(());
        }

        info!(
            count = outcome.links.len(),
            folder = %folder.display(),
            "found artifacts to download"
        );
        fs::create_dir_all(folder).await?;

        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let mut tasks = JoinSet::new();
        for link in outcome.links {
            let semaphore = semaphore.clone();
            let http = self.http.clone();
            let destination = folder.join(&link.filename);
            let overwrite = self.config.overwrite;
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| SyncError::Join("semaphore closed".to_string()))?;
                download_one(http, link, destination, overwrite).await
            });
        }

        // The first failure is propagated only after every dispatched
        // download has been awaited.
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
}

/// Download one artifact through a `.part` sibling, renaming into place on
/// success.
async fn download_one(
    http: Arc<dyn HttpClient>,
    link: ArtifactLink,
    destination: PathBuf,
    overwrite: bool,
) -> Result<()> {
    if !overwrite && fs::try_exists(&destination).await? {
        info!(file = %destination.display(), "already exists");
        return Ok(());
    }

    info!(url = %link.url, "downloading");
    let part = destination.with_file_name(format!("{}.part", link.filename));
    match stream_to_file(http.as_ref(), &link.url, &part).await {
        Ok(()) => {
            fs::rename(&part, &destination).await?;
            Ok(())
        }
        Err(err) => {
            // Best effort: the partial file must not survive.
            let _ = fs::remove_file(&part).await;
            Err(err)
        }
    }
}

async fn stream_to_file(http: &dyn HttpClient, url: &str, path: &Path) -> Result<()> {
    let mut reader = http
        .download_stream(url.to_string())
        .await
        .map_err(|e| SyncError::Download {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    let mut file = fs::File::create(path).await?;
    tokio::io::copy(&mut reader, &mut file)
        .await
        .map_err(|e| SyncError::Download {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    file.flush().await?;
    Ok(())
}
