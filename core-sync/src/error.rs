use core_artifact::ArtifactError;
use store_traits::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed manifest {name}: {message}")]
    ManifestDecode { name: String, message: String },

    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    #[error("Transfer task failed: {0}")]
    Join(String),
}

impl SyncError {
    /// Terminal failures are surfaced immediately instead of retried.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncError::Store(e) if e.is_credentials())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
