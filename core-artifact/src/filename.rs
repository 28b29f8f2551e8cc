//! Artifact filename grammars.
//!
//! Decodes the three historical filename families produced by packaging
//! pipelines: wheels (`name-version-pytag-abitag-platformtag.whl`), legacy
//! installer executables (`name-version.platform[-pyX.Y].exe`) and source
//! archives (`name-version.zip` / `.tar.gz`).

use std::fmt;

use crate::descriptor::{
    normalize_component, ArtifactDescriptor, ArtifactKind, ArtifactTags,
};
use crate::error::{ArtifactError, Result};
use crate::version::VersionClassifier;

/// Interpreter version substituted for tags that do not encode one.
///
/// Universal wheel tags (`py2.py3`) and tag-less installers are interpreter
/// independent; the original toolchain substituted the running interpreter's
/// version when decoding them. The codec keeps that substitution but takes
/// the version as an explicit value, so decoding is deterministic for a
/// given codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
}

impl PythonVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for PythonVersion {
    fn default() -> Self {
        Self::new(3, 12)
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Parses and renders artifact filenames.
pub struct FilenameCodec {
    host_python: PythonVersion,
    versions: VersionClassifier,
}

impl Default for FilenameCodec {
    fn default() -> Self {
        Self::new(PythonVersion::default())
    }
}

impl FilenameCodec {
    pub fn new(host_python: PythonVersion) -> Self {
        Self {
            host_python,
            versions: VersionClassifier::new(),
        }
    }

    /// The version classifier used for canonicalization.
    pub fn versions(&self) -> &VersionClassifier {
        &self.versions
    }

    /// Parse a filename into its artifact descriptor.
    ///
    /// When `expected_distribution` is given, consistency is checked after
    /// normalizing both sides and a `NameMismatch` is raised on violation.
    pub fn parse(
        &self,
        filename: &str,
        expected_distribution: Option<&str>,
    ) -> Result<ArtifactDescriptor> {
        if let Some(basename) = filename.strip_suffix(".whl") {
            self.parse_wheel(filename, basename, expected_distribution)
        } else if let Some(basename) = filename.strip_suffix(".exe") {
            self.parse_installer(filename, basename, expected_distribution)
        } else if let Some(basename) = filename.strip_suffix(".zip") {
            self.parse_source(filename, basename, expected_distribution)
        } else if let Some(basename) = filename.strip_suffix(".tar.gz") {
            self.parse_source(filename, basename, expected_distribution)
        } else {
            Err(ArtifactError::UnrecognizedFormat {
                filename: filename.to_string(),
            })
        }
    }

    /// Render a wheel filename for `descriptor` with a replacement version.
    ///
    /// Inverse of the wheel grammar only; used when stamping dev builds.
    pub fn wheel_filename(&self, descriptor: &ArtifactDescriptor, version: &str) -> Result<String> {
        if descriptor.kind != ArtifactKind::BuiltWheel {
            return Err(ArtifactError::UnstampableKind {
                filename: descriptor.distribution.clone(),
            });
        }
        let ArtifactTags {
            python: Some(python),
            abi: Some(abi),
            platform: Some(platform),
        } = &descriptor.tags
        else {
            return Err(ArtifactError::UnrecognizedFormat {
                filename: descriptor.distribution.clone(),
            });
        };
        Ok(format!(
            "{}-{}-{}-{}-{}.whl",
            descriptor.distribution, version, python, abi, platform
        ))
    }

    fn parse_wheel(
        &self,
        filename: &str,
        basename: &str,
        expected: Option<&str>,
    ) -> Result<ArtifactDescriptor> {
        let components: Vec<&str> = basename.split('-').collect();
        if components.len() < 3 || components[2].chars().count() < 3 {
            return Err(ArtifactError::UnrecognizedFormat {
                filename: filename.to_string(),
            });
        }
        let distribution = normalize_component(components[0]);
        check_expected(filename, &distribution, expected)?;
        let version = self.versions.canonicalize(components[1])?;
        let pytag = components[2];
        let python_version = self.decode_python_tag(filename, pytag)?;
        let tags = ArtifactTags {
            python: Some(pytag.to_string()),
            abi: components.get(3).map(|s| s.to_string()),
            platform: components.get(4).map(|s| s.to_string()),
        };
        Ok(ArtifactDescriptor {
            distribution,
            version,
            python_version,
            kind: ArtifactKind::BuiltWheel,
            tags,
        })
    }

    fn decode_python_tag(&self, filename: &str, pytag: &str) -> Result<String> {
        if pytag == "py2.py3" {
            // Universal tag: substitute the configured interpreter version.
            return Ok(self.host_python.to_string());
        }
        let chars: Vec<char> = pytag.chars().collect();
        let family: String = chars.iter().take(2).collect();
        match (family.as_str(), chars.len()) {
            ("py", 3) => Ok(chars[2].to_string()),
            ("py", 4) | ("pp", 4) => Ok(format!("{}.{}", chars[2], chars[3])),
            ("cp", n) if n >= 4 => Ok(format!("{}.{}", chars[2], chars[3])),
            _ => Err(ArtifactError::UnsupportedPythonTag {
                filename: filename.to_string(),
            }),
        }
    }

    fn parse_installer(
        &self,
        filename: &str,
        basename: &str,
        expected: Option<&str>,
    ) -> Result<ArtifactDescriptor> {
        // A trailing `-pyX.Y` segment is optional; without one the installer
        // is interpreter independent.
        let (remainder, pytag) = match basename.rsplit_once('-') {
            Some((head, last)) if last.starts_with("py") => (head, last.to_string()),
            _ => (basename, format!("py{}", self.host_python)),
        };
        let (name_and_version, platform) =
            remainder
                .rsplit_once('.')
                .ok_or_else(|| ArtifactError::UnrecognizedFormat {
                    filename: filename.to_string(),
                })?;
        let (name, raw_version) =
            name_and_version
                .rsplit_once('-')
                .ok_or_else(|| ArtifactError::UnrecognizedFormat {
                    filename: filename.to_string(),
                })?;
        let distribution = normalize_component(name);
        check_expected(filename, &distribution, expected)?;
        let version = self.versions.canonicalize(raw_version)?;
        let python_version = pytag[2..].to_string();
        let tags = ArtifactTags {
            python: Some(pytag.replace('.', "")),
            abi: None,
            platform: Some(normalize_component(platform)),
        };
        Ok(ArtifactDescriptor {
            distribution,
            version,
            python_version,
            kind: ArtifactKind::LegacyInstaller,
            tags,
        })
    }

    fn parse_source(
        &self,
        filename: &str,
        basename: &str,
        expected: Option<&str>,
    ) -> Result<ArtifactDescriptor> {
        let (name, raw_version) =
            basename
                .rsplit_once('-')
                .ok_or_else(|| ArtifactError::UnrecognizedFormat {
                    filename: filename.to_string(),
                })?;
        let distribution = normalize_component(name);
        check_expected(filename, &distribution, expected)?;
        let version = self.versions.canonicalize(raw_version)?;
        Ok(ArtifactDescriptor {
            distribution,
            version,
            python_version: String::new(),
            kind: ArtifactKind::SourceDist,
            tags: ArtifactTags::default(),
        })
    }
}

fn check_expected(filename: &str, distribution: &str, expected: Option<&str>) -> Result<()> {
    if let Some(expected) = expected {
        if distribution != normalize_component(expected) {
            return Err(ArtifactError::NameMismatch {
                filename: filename.to_string(),
                expected: expected.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> FilenameCodec {
        FilenameCodec::new(PythonVersion::new(3, 12))
    }

    #[test]
    fn test_parse_wheel() {
        let d = codec()
            .parse("scikit_learn-0.15.2-cp34-none-win32.whl", None)
            .unwrap();
        assert_eq!(d.distribution, "scikit_learn");
        assert_eq!(d.version, "0.15.2");
        assert_eq!(d.python_version, "3.4");
        assert_eq!(d.kind, ArtifactKind::BuiltWheel);
        assert_eq!(d.tags.python.as_deref(), Some("cp34"));
        assert_eq!(d.tags.abi.as_deref(), Some("none"));
        assert_eq!(d.tags.platform.as_deref(), Some("win32"));
    }

    #[test]
    fn test_parse_universal_wheel_uses_host_python() {
        let d = codec()
            .parse("project-1.0-py2.py3-none-any.whl", None)
            .unwrap();
        assert_eq!(d.distribution, "project");
        assert_eq!(d.version, "1.0");
        assert_eq!(d.python_version, "3.12");
        assert_eq!(d.kind, ArtifactKind::BuiltWheel);

        let other = FilenameCodec::new(PythonVersion::new(2, 7))
            .parse("project-1.0-py2.py3-none-any.whl", None)
            .unwrap();
        assert_eq!(other.python_version, "2.7");
    }

    #[test]
    fn test_parse_wheel_single_digit_tags() {
        let c = codec();
        let d = c
            .parse("sklearn_template-0.0.3-py2-none-any.whl", None)
            .unwrap();
        assert_eq!(d.python_version, "2");
        let d = c
            .parse("sklearn_template-0.0.3-py3-none-any.whl", None)
            .unwrap();
        assert_eq!(d.python_version, "3");
    }

    #[test]
    fn test_parse_wheel_two_digit_and_pypy_tags() {
        let c = codec();
        let d = c.parse("pkg-0.1-py27-none-any.whl", None).unwrap();
        assert_eq!(d.python_version, "2.7");
        let d = c.parse("pkg-0.1-pp34-none-any.whl", None).unwrap();
        assert_eq!(d.python_version, "3.4");
    }

    #[test]
    fn test_parse_wheel_multi_platform_tag() {
        let d = codec()
            .parse(
                "scikit_learn-0.15.1-cp34-cp34m-macosx_10_6_intel.macosx_10_9_intel.macosx_10_9_x86_64.whl",
                None,
            )
            .unwrap();
        assert_eq!(d.distribution, "scikit_learn");
        assert_eq!(d.version, "0.15.1");
        assert_eq!(d.python_version, "3.4");
    }

    #[test]
    fn test_parse_wheel_canonicalizes_dev_version() {
        let d = codec()
            .parse("scikit_learn-0.15.2.dev-cp34-none-win32.whl", Some("scikit-learn"))
            .unwrap();
        assert_eq!(d.version, "0.15.2.dev0");

        let d = codec()
            .parse("scikit_learn-0.15.dev0+local3-cp27-none-win32.whl", None)
            .unwrap();
        assert_eq!(d.version, "0.15.dev0+local3");
        assert_eq!(d.python_version, "2.7");
    }

    #[test]
    fn test_parse_wheel_rejects_malformed() {
        let c = codec();
        assert!(matches!(
            c.parse("pkg-1.0.whl", None),
            Err(ArtifactError::UnrecognizedFormat { .. })
        ));
        assert!(matches!(
            c.parse("pkg-1.0-py-none-any.whl", None),
            Err(ArtifactError::UnrecognizedFormat { .. })
        ));
        assert!(matches!(
            c.parse("pkg-1.0-xy34-none-any.whl", None),
            Err(ArtifactError::UnsupportedPythonTag { .. })
        ));
    }

    #[test]
    fn test_parse_wheel_name_mismatch() {
        assert!(matches!(
            codec().parse("scikit_learn-0.15.2-cp34-none-win32.whl", Some("numpy")),
            Err(ArtifactError::NameMismatch { .. })
        ));
    }

    #[test]
    fn test_parse_installer_with_python_tag() {
        let d = codec()
            .parse("scikit-learn-0.15.1rc.win-amd64-py2.7.exe", Some("scikit-learn"))
            .unwrap();
        assert_eq!(d.distribution, "scikit_learn");
        assert_eq!(d.version, "0.15.1rc0");
        assert_eq!(d.python_version, "2.7");
        assert_eq!(d.kind, ArtifactKind::LegacyInstaller);
        assert_eq!(d.tags.python.as_deref(), Some("py27"));
        assert_eq!(d.tags.abi, None);
        assert_eq!(d.tags.platform.as_deref(), Some("win_amd64"));
    }

    #[test]
    fn test_parse_installer_without_python_tag() {
        let d = codec()
            .parse("sklearn-template-0.0.3.win32.exe", None)
            .unwrap();
        assert_eq!(d.distribution, "sklearn_template");
        assert_eq!(d.version, "0.0.3");
        // Interpreter independent: the configured version is substituted.
        assert_eq!(d.python_version, "3.12");
        assert_eq!(d.tags.python.as_deref(), Some("py312"));

        let d = codec()
            .parse("sklearn-template-0.0.3.win-amd64.exe", None)
            .unwrap();
        assert_eq!(d.tags.platform.as_deref(), Some("win_amd64"));
    }

    #[test]
    fn test_parse_installer_simple() {
        let d = codec()
            .parse("scikit-learn-0.15.2.win32-py2.7.exe", None)
            .unwrap();
        assert_eq!(d.distribution, "scikit_learn");
        assert_eq!(d.version, "0.15.2");
        assert_eq!(d.python_version, "2.7");
    }

    #[test]
    fn test_parse_source_archives() {
        let c = codec();
        for filename in ["scikit-learn-0.15.1.tar.gz", "scikit-learn-0.15.1.zip"] {
            let d = c.parse(filename, Some("scikit-learn")).unwrap();
            assert_eq!(d.distribution, "scikit_learn");
            assert_eq!(d.version, "0.15.1");
            assert_eq!(d.python_version, "");
            assert_eq!(d.kind, ArtifactKind::SourceDist);
            assert!(d.tags.is_empty());
        }
    }

    #[test]
    fn test_parse_rejects_unknown_extension() {
        assert!(matches!(
            codec().parse("scikit-learn-0.15.1.tar.bz2", None),
            Err(ArtifactError::UnrecognizedFormat { .. })
        ));
    }

    #[test]
    fn test_wheel_filename_round_trip() {
        let c = codec();
        let original = "scikit_learn-0.15.2-cp34-none-win32.whl";
        let d = c.parse(original, None).unwrap();
        let rendered = c.wheel_filename(&d, &d.version).unwrap();
        assert_eq!(rendered, original);
        let reparsed = c.parse(&rendered, None).unwrap();
        assert_eq!(reparsed, d);
    }

    #[test]
    fn test_wheel_filename_rejects_non_wheel() {
        let c = codec();
        let d = c.parse("scikit-learn-0.15.1.tar.gz", None).unwrap();
        assert!(c.wheel_filename(&d, "0.15.1").is_err());
    }
}
