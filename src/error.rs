//! Error types for the catalog pipeline
//!
//! Structural errors (missing required catalog fields, unparsable input
//! documents) are fatal: the catalog is a trusted, validated artifact, so a
//! malformed one indicates upstream corruption rather than user input.
//! Consistency-check failures are not errors at this level; they are
//! collected in a [`crate::validation::ValidationReport`] at the end of a
//! run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum Error {
    /// The catalog document violates its own structural contract
    #[error("Structural error in catalog: {message}")]
    Structural { message: String },

    /// Input document could not be read
    #[error("Failed to read {path}: {source}")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input document could not be parsed as JSON
    #[error("Failed to parse {path}: {message}")]
    DocumentParse { path: PathBuf, message: String },

    /// Policy data file (family metadata, FedRAMP tables) is invalid
    #[error("Invalid policy data {name}: {message}")]
    PolicyData { name: String, message: String },

    /// Artifact write error
    #[error("Failed to write artifact {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a structural error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
        }
    }

    /// Create a policy-data error
    pub fn policy_data(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PolicyData {
            name: name.into(),
            message: message.into(),
        }
    }
}
