//! Rendered HTML index.
//!
//! One link per artifact, annotated with a `#sha256=` fragment when the
//! manifest knows the digest. The index is regenerated wholesale on every
//! successful sync, never patched.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::manifest::RemoteManifest;

/// Name of the index object in the container.
pub const INDEX_OBJECT: &str = "index.html";

/// Manifest and index objects never list themselves.
pub fn is_derived_object(name: &str) -> bool {
    name.ends_with(".json") || name.ends_with(".html")
}

/// Render the index for the given object names, sorted by filename.
pub fn render_index(names: &BTreeSet<String>, manifest: &RemoteManifest) -> String {
    let mut payload = String::from("<html><body><p>\n");
    for name in names {
        if is_derived_object(name) {
            continue;
        }
        match manifest.get(name) {
            Some(entry) => {
                let _ = writeln!(
                    payload,
                    "<li><a href=\"{name}#sha256={digest}\">{name}<a></li>",
                    digest = entry.sha256
                );
            }
            None => {
                let _ = writeln!(payload, "<li><a href=\"{name}\">{name}<a></li>");
            }
        }
    }
    payload.push_str("</p></body></html>\n");
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ArtifactMetadataEntry;

    #[test]
    fn test_render_index() {
        let mut manifest = RemoteManifest::default();
        manifest.insert(
            "pkg-1.0.tar.gz".to_string(),
            ArtifactMetadataEntry {
                sha256: "abc123".to_string(),
                size: 10,
            },
        );

        let names: BTreeSet<String> = [
            "pkg-1.0.tar.gz".to_string(),
            "pkg-0.9.tar.gz".to_string(),
            "metadata.json".to_string(),
            "index.html".to_string(),
        ]
        .into_iter()
        .collect();

        let html = render_index(&names, &manifest);
        assert_eq!(
            html,
            "<html><body><p>\n\
             <li><a href=\"pkg-0.9.tar.gz\">pkg-0.9.tar.gz<a></li>\n\
             <li><a href=\"pkg-1.0.tar.gz#sha256=abc123\">pkg-1.0.tar.gz<a></li>\n\
             </p></body></html>\n"
        );
    }

    #[test]
    fn test_derived_objects_are_excluded() {
        assert!(is_derived_object("metadata.json"));
        assert!(is_derived_object("index.html"));
        assert!(!is_derived_object("pkg-1.0-py2.py3-none-any.whl"));
    }
}
