//! # Artifact Identity Engine
//!
//! Parses packaging artifact filenames into structured metadata and decides
//! which artifacts supersede each other.
//!
//! ## Overview
//!
//! This crate is pure and performs no I/O. It provides:
//!
//! - **Filename grammars** ([`FilenameCodec`]): wheels, legacy `.exe`
//!   installers and source archives, decoded into an [`ArtifactDescriptor`]
//! - **Version classification** ([`VersionClassifier`]): development-build
//!   detection and lexically monotonic timestamp stamping on top of an
//!   external PEP 440 parser
//! - **Dev-build stamping** ([`stamp_if_dev`]): renames freshly built
//!   development wheels so upload ordering and retention follow build time
//! - **Supersession** ([`matching_dev_filenames`]): finds the development
//!   builds occupying the same [`BuildSlot`], newest first

pub mod descriptor;
pub mod error;
pub mod filename;
pub mod stamper;
pub mod version;

pub use descriptor::{
    normalize_component, ArtifactDescriptor, ArtifactKind, ArtifactTags, BuildSlot,
};
pub use error::{ArtifactError, Result};
pub use filename::{FilenameCodec, PythonVersion};
pub use stamper::{matching_dev_filenames, stamp_if_dev, StampOutcome};
pub use version::VersionClassifier;
