//! Remote metadata manifest.
//!
//! A single JSON object mapping artifact filenames to their digest and
//! size, stored as one named object next to the artifacts. The manifest is
//! read-modify-written without locking: at most one sync process per
//! container is assumed.

use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap, BTreeSet};

use crate::error::{Result, SyncError};

/// Name of the manifest object in the container.
pub const MANIFEST_OBJECT: &str = "metadata.json";

/// Digest and size recorded for one uploaded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadataEntry {
    pub sha256: String,
    pub size: u64,
}

/// Filename-keyed metadata manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteManifest {
    entries: BTreeMap<String, ArtifactMetadataEntry>,
}

impl RemoteManifest {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| SyncError::ManifestDecode {
            name: MANIFEST_OBJECT.to_string(),
            message: e.to_string(),
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self).map_err(|e| SyncError::ManifestDecode {
            name: MANIFEST_OBJECT.to_string(),
            message: e.to_string(),
        })
    }

    pub fn get(&self, filename: &str) -> Option<&ArtifactMetadataEntry> {
        self.entries.get(filename)
    }

    pub fn insert(&mut self, filename: String, entry: ArtifactMetadataEntry) {
        self.entries.insert(filename, entry);
    }

    /// Merge entries in, overwriting existing keys: the local side of a sync
    /// is authoritative for the files it just uploaded.
    pub fn merge(&mut self, entries: impl IntoIterator<Item = (String, ArtifactMetadataEntry)>) {
        self.entries.extend(entries);
    }

    /// Drop every entry whose filename is not in `known`.
    ///
    /// `known` must be the container listing unioned with the filenames
    /// uploaded by the current operation; listings are eventually consistent
    /// and may not include them yet.
    pub fn retain_known(&mut self, known: &BTreeSet<String>) {
        self.entries.retain(|name, _| known.contains(name));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ArtifactMetadataEntry> {
        self.entries.iter()
    }
}
