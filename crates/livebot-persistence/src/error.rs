//! Error types for the persistence layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing livebot's files.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading a file failed.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Writing a file failed.
    #[error("failed to write {path}: {source}")]
    WriteError {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Creating a directory failed.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// File contents were not valid JSON for the expected type.
    #[error("invalid JSON in {path}: {source}")]
    InvalidJson {
        /// File with bad contents.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// Serializing a value failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
