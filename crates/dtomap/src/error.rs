//! Error types for the dtomap library.
//!
//! Mapping itself never fails. These errors come from building rule sets
//! and from reading or writing rule files.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dtomap operations.
#[derive(Debug, Error)]
pub enum DtomapError {
    /// A source path could not be parsed.
    #[error("Invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// A fallback value does not match the rule's coercion kind.
    #[error("Fallback for '{target}' must be a {expected} value, got {found}")]
    FallbackMismatch {
        target: String,
        expected: String,
        found: String,
    },

    /// Two rules write to the same output field.
    #[error("Duplicate target field: {0}")]
    DuplicateTarget(String),

    /// Coercion kind name not recognized.
    #[error("Unknown coercion kind: {0}")]
    UnknownKind(String),

    /// Error reading or writing a rule file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for dtomap operations.
pub type Result<T> = std::result::Result<T, DtomapError>;
