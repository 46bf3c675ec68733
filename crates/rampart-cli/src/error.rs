//! Error types for the Rampart CLI

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Input file not found
    #[error("Input not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Unknown baseline name on the command line
    #[error("Unknown baseline: {name}. Valid options: low, moderate, high")]
    UnknownBaseline { name: String },

    /// The run completed but failed its consistency checks
    #[error("Validation failed with {count} error(s)")]
    ValidationFailed { count: usize },

    /// Pipeline error
    #[error(transparent)]
    Pipeline(#[from] rampart::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
