//! Version classification and timestamp stamping.
//!
//! Wraps the external PEP 440 parser: canonicalization, development-build
//! detection and the local-segment timestamp scheme that keeps successive CI
//! builds ordered at one-second resolution.

use chrono::{DateTime, Utc};
use pep440_rs::Version;
use regex_lite::Regex;
use std::str::FromStr;

use crate::error::{ArtifactError, Result};

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Classifies version strings on top of the PEP 440 grammar.
#[derive(Debug, Clone)]
pub struct VersionClassifier {
    stamp_pattern: Regex,
}

impl Default for VersionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionClassifier {
    pub fn new() -> Self {
        // A local segment carrying an injected 14-digit UTC build timestamp,
        // optionally followed by the original local part.
        let stamp_pattern = Regex::new(r"^\d{14}(_\w+)?").expect("valid stamp pattern");
        Self { stamp_pattern }
    }

    /// Parse a version string, failing with `InvalidVersion` when it does
    /// not conform to the grammar.
    pub fn parse(&self, version: &str) -> Result<Version> {
        Version::from_str(version).map_err(|_| ArtifactError::InvalidVersion {
            version: version.to_string(),
        })
    }

    /// Normalized rendering of a version string.
    pub fn canonicalize(&self, version: &str) -> Result<String> {
        Ok(self.parse(version)?.to_string())
    }

    /// True iff the version carries a development-release segment.
    ///
    /// Unparseable input is not a development version.
    pub fn is_development(&self, version: &str) -> bool {
        Version::from_str(version)
            .map(|v| v.dev().is_some())
            .unwrap_or(false)
    }

    /// True iff the local segment starts with a 14-digit timestamp,
    /// optionally followed by `_<suffix>`.
    pub fn has_local_timestamp_segment(&self, version: &str) -> bool {
        let Ok(parsed) = Version::from_str(version) else {
            return false;
        };
        match local_segment(&parsed) {
            Some(local) => self.stamp_pattern.is_match(&local),
            None => false,
        }
    }

    /// Prefix the local segment with the current UTC timestamp.
    pub fn stamp_with_timestamp(&self, version: &str) -> Result<String> {
        self.stamp_with_timestamp_at(version, Utc::now())
    }

    /// Prefix the local segment with the UTC timestamp of `instant`, joined
    /// to any pre-existing local segment by `_`. The lexical and PEP 440
    /// ordering of successive stamps matches the CI build ordering.
    pub fn stamp_with_timestamp_at(&self, version: &str, instant: DateTime<Utc>) -> Result<String> {
        let parsed = self.parse(version)?;
        let timestamp = instant.format(STAMP_FORMAT).to_string();
        let rendered = parsed.to_string();
        match rendered.split_once('+') {
            Some((public, local)) => Ok(format!("{public}+{timestamp}_{local}")),
            None => Ok(format!("{rendered}+{timestamp}")),
        }
    }
}

fn local_segment(version: &Version) -> Option<String> {
    let rendered = version.to_string();
    rendered.split_once('+').map(|(_, local)| local.to_string())
}
