//! Artifact link discovery on remote HTML index pages.
//!
//! A single-pattern `href="..."` scan, deliberately not an HTML parser:
//! index pages are machine generated and the only structure relied upon is
//! the attribute itself.

use core_artifact::FilenameCodec;
use regex_lite::Regex;
use std::collections::BTreeSet;
use tracing::debug;

/// One downloadable artifact discovered on an index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLink {
    pub url: String,
    pub filename: String,
}

/// Outcome of scanning one index page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Links whose filename parsed and matched the requested project and
    /// version.
    pub links: Vec<ArtifactLink>,
    /// Versions of parseable artifacts excluded by the version filter; kept
    /// for diagnostics when nothing matches.
    pub versions_seen: BTreeSet<String>,
}

/// Extracts candidate download links from raw HTML.
pub struct ArtifactLinkScanner {
    link_pattern: Regex,
}

impl Default for ArtifactLinkScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactLinkScanner {
    pub fn new() -> Self {
        let link_pattern = Regex::new(r#"\bhref="([^"]+)""#).expect("valid link pattern");
        Self { link_pattern }
    }

    /// Scan `html` for links to artifacts of `project_name`, resolving each
    /// against `index_url`. Links that do not parse as artifact filenames
    /// are skipped, never an error.
    pub fn scan(
        &self,
        html: &str,
        index_url: &str,
        codec: &FilenameCodec,
        project_name: &str,
        version: Option<&str>,
    ) -> ScanOutcome {
        let wanted = version.map(|v| {
            codec
                .versions()
                .canonicalize(v)
                .unwrap_or_else(|_| v.to_string())
        });

        let mut outcome = ScanOutcome::default();
        for captures in self.link_pattern.captures_iter(html) {
            let link = &captures[1];
            let url = resolve_link(index_url, link);
            let filename = trailing_filename(&url);
            let descriptor = match codec.parse(&filename, Some(project_name)) {
                Ok(descriptor) => descriptor,
                Err(err) => {
                    debug!(link = %link, error = %err, "skipping non-artifact link");
                    continue;
                }
            };
            if let Some(wanted) = &wanted {
                if &descriptor.version != wanted {
                    outcome.versions_seen.insert(descriptor.version);
                    continue;
                }
            }
            outcome.links.push(ArtifactLink { url, filename });
        }
        outcome
    }
}

/// Resolve a scraped link against the index URL it came from.
fn resolve_link(index_url: &str, link: &str) -> String {
    if link.starts_with('/') {
        format!("{}{}", origin_of(index_url), link)
    } else if index_url.ends_with('/') {
        format!("{index_url}{link}")
    } else if index_url.ends_with(".html") {
        match index_url.rfind('/') {
            Some(pos) => format!("{}{}", &index_url[..pos + 1], link),
            None => link.to_string(),
        }
    } else {
        format!("{index_url}/{link}")
    }
}

/// `scheme://host[:port]` of a URL.
fn origin_of(url: &str) -> &str {
    let scheme_end = url.find("://").map(|pos| pos + 3).unwrap_or(0);
    match url[scheme_end..].find('/') {
        Some(pos) => &url[..scheme_end + pos],
        None => url,
    }
}

/// Trailing path segment, with any `#fragment` stripped.
fn trailing_filename(url: &str) -> String {
    let without_fragment = match url.split_once('#') {
        Some((head, _)) => head,
        None => url,
    };
    match without_fragment.rsplit_once('/') {
        Some((_, name)) => name.to_string(),
        None => without_fragment.to_string(),
    }
}
