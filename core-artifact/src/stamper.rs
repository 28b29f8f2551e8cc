//! Development build stamping and supersession.

use crate::descriptor::ArtifactKind;
use crate::error::{ArtifactError, Result};
use crate::filename::FilenameCodec;

/// Result of a stamping attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampOutcome {
    /// Whether the filename changed; when true the caller must rename the
    /// underlying file before uploading it.
    pub renamed: bool,
    pub filename: String,
}

impl StampOutcome {
    fn unchanged(filename: &str) -> Self {
        Self {
            renamed: false,
            filename: filename.to_string(),
        }
    }
}

/// Rename a filename to add a timestamp, only if this is a dev package.
///
/// Release packages and already-stamped dev packages pass through unchanged,
/// so stamping is idempotent. Development builds that are not wheels cannot
/// be renamed safely and fail with `UnstampableKind`.
pub fn stamp_if_dev(codec: &FilenameCodec, filename: &str) -> Result<StampOutcome> {
    let descriptor = codec.parse(filename, None)?;
    let versions = codec.versions();
    if !versions.is_development(&descriptor.version) {
        return Ok(StampOutcome::unchanged(filename));
    }
    if descriptor.kind != ArtifactKind::BuiltWheel {
        return Err(ArtifactError::UnstampableKind {
            filename: filename.to_string(),
        });
    }
    if versions.has_local_timestamp_segment(&descriptor.version) {
        return Ok(StampOutcome::unchanged(filename));
    }
    let stamped = versions.stamp_with_timestamp(&descriptor.version)?;
    Ok(StampOutcome {
        renamed: true,
        filename: codec.wheel_filename(&descriptor, &stamped)?,
    })
}

/// Filter `existing` for dev builds occupying the same build slot as
/// `reference`, sorted by descending parsed version.
///
/// Returns an empty list when the reference is not a dev version or cannot
/// be parsed; candidates that cannot be parsed or are not dev versions are
/// skipped.
pub fn matching_dev_filenames(
    codec: &FilenameCodec,
    reference: &str,
    existing: &[String],
) -> Vec<String> {
    let versions = codec.versions();
    let Ok(descriptor) = codec.parse(reference, None) else {
        return Vec::new();
    };
    if !versions.is_development(&descriptor.version) {
        return Vec::new();
    }
    let slot = descriptor.build_slot();

    let mut matching = Vec::new();
    for filename in existing {
        let Ok(candidate) = codec.parse(filename, None) else {
            continue;
        };
        if !versions.is_development(&candidate.version) {
            continue;
        }
        if candidate.build_slot() != slot {
            continue;
        }
        let Ok(parsed) = versions.parse(&candidate.version) else {
            continue;
        };
        matching.push((parsed, filename.clone()));
    }
    matching.sort_by(|a, b| b.0.cmp(&a.0));
    matching.into_iter().map(|(_, filename)| filename).collect()
}
