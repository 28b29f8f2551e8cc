//! # Sync Engine
//!
//! Synchronizes a local artifact folder against a remote object-storage
//! container and keeps the derived metadata manifest and HTML index
//! consistent with the stored objects.
//!
//! ## Overview
//!
//! - **Upload path** ([`Uploader`]): container ensure → local scan →
//!   dev-build stamping → concurrent bounded uploads → manifest refresh and
//!   garbage collection → index regeneration → dev-build retention, the
//!   whole operation retried on transient failures.
//! - **Fetch path** ([`Fetcher`]): scans a remote HTML index for artifact
//!   links and downloads the matching ones concurrently, streaming through
//!   `.part` files that are renamed into place only on success.
//! - **Link scanning** ([`ArtifactLinkScanner`]): single-pattern `href`
//!   extraction with minimal URL resolution; deliberately not an HTML
//!   parser.
//! - **Manifest / index** ([`RemoteManifest`], [`render_index`]): the two
//!   derived remote objects.
//!
//! The engine depends only on the abstract storage capabilities in
//! `store-traits`; concrete backends are injected.

pub mod error;
pub mod fetcher;
pub mod index;
pub mod manifest;
pub mod scanner;
pub mod uploader;

pub use error::{Result, SyncError};
pub use fetcher::{FetchConfig, Fetcher};
pub use index::{render_index, INDEX_OBJECT};
pub use manifest::{ArtifactMetadataEntry, RemoteManifest, MANIFEST_OBJECT};
pub use scanner::{ArtifactLink, ArtifactLinkScanner, ScanOutcome};
pub use uploader::{UploadConfig, Uploader};
