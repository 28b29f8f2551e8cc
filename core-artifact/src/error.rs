use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    /// The filename extension or internal structure is not a supported
    /// artifact grammar.
    #[error("Invalid filename \"{filename}\", unrecognized format")]
    UnrecognizedFormat { filename: String },

    /// The parsed distribution name disagrees with the expected one.
    #[error("File {filename} does not match project name {expected}")]
    NameMismatch { filename: String, expected: String },

    /// The wheel python tag is not one of the decodable families.
    #[error("Invalid or unsupported Python version tag in filename {filename}")]
    UnsupportedPythonTag { filename: String },

    /// The version string does not conform to the version grammar.
    #[error("Invalid version: {version}")]
    InvalidVersion { version: String },

    /// Only dev wheel files encode enough structure to be safely renamed.
    #[error("{filename}: only dev wheel files can be stamped for upload")]
    UnstampableKind { filename: String },
}

pub type Result<T> = std::result::Result<T, ArtifactError>;
