//! Fatal errors
//!
//! Only conditions that make a digest impossible end up here. Everything else
//! (limit overruns, unreadable entries, undecodable files) degrades into a
//! [`ScanWarning`](crate::core::warning::ScanWarning) or an inline placeholder.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a digest
#[derive(Error, Debug)]
pub enum DigestError {
    /// The traversal root does not exist.
    #[error("Path not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// The traversal root exists but cannot be read.
    #[error("Cannot read {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Single-file mode produced no content.
    #[error("File {0} has no content")]
    EmptyContent(String),

    /// A user supplied include/exclude pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, DigestError>;
