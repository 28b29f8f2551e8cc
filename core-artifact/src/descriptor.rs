//! Parsed artifact identity values.

use std::fmt;

/// Supported artifact archive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// A built wheel (`.whl`).
    BuiltWheel,
    /// A legacy Windows installer executable (`.exe`).
    LegacyInstaller,
    /// A source archive (`.zip`, `.tar.gz`).
    SourceDist,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::BuiltWheel => "bdist_wheel",
            ArtifactKind::LegacyInstaller => "bdist_wininst",
            ArtifactKind::SourceDist => "sdist",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compatibility tags carried by a filename.
///
/// Wheels carry all three tags verbatim from the filename; legacy installers
/// carry a python tag and an escaped platform; source archives carry none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactTags {
    pub python: Option<String>,
    pub abi: Option<String>,
    pub platform: Option<String>,
}

impl ArtifactTags {
    pub fn is_empty(&self) -> bool {
        self.python.is_none() && self.abi.is_none() && self.platform.is_none()
    }
}

/// Parsed identity of one artifact filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// Normalized distribution name.
    pub distribution: String,
    /// Canonical version string.
    pub version: String,
    /// Decoded target interpreter version (`"3.4"`, `"2"`, ...); empty for
    /// source archives.
    pub python_version: String,
    pub kind: ArtifactKind,
    pub tags: ArtifactTags,
}

impl ArtifactDescriptor {
    /// The equivalence key deciding whether two artifacts occupy the same
    /// build slot: development builds sharing a slot supersede each other
    /// across versions.
    pub fn build_slot(&self) -> BuildSlot {
        BuildSlot {
            distribution: self.distribution.clone(),
            kind: self.kind,
            tags: self.tags.clone(),
        }
    }
}

/// `(distribution name, artifact kind, tag set)` equivalence key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildSlot {
    pub distribution: String,
    pub kind: ArtifactKind,
    pub tags: ArtifactTags,
}

/// Collapse runs of characters outside `[alphanumeric _ .]` to a single `_`.
///
/// Applied to both sides of every distribution-name comparison, and to the
/// platform component of installer filenames.
pub fn normalize_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut in_run = false;
    for c in component.chars() {
        if c.is_alphanumeric() || c == '_' || c == '.' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}
