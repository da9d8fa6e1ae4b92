//! Error types for the directory watcher.

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors that can occur while building or running a watcher.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Watch root not found.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// Watch root exists but is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Invalid file name pattern.
    #[error("invalid glob pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying compile error.
        #[source]
        source: glob::PatternError,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
