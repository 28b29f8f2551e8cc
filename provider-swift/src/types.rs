//! Swift API response types

use serde::Deserialize;

/// One object in a container listing (`GET <container>?format=json`).
#[derive(Debug, Clone, Deserialize)]
pub struct SwiftObject {
    /// Object name
    pub name: String,

    /// Object size in bytes
    #[serde(default)]
    pub bytes: u64,

    /// ETag/MD5 of the stored content
    #[serde(default)]
    pub hash: Option<String>,

    /// Last modification time
    #[serde(default)]
    pub last_modified: Option<String>,

    /// Content type recorded at upload
    #[serde(default)]
    pub content_type: Option<String>,
}
