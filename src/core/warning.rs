//! Traversal warnings
//!
//! Recorded whenever the scan degrades instead of aborting: a limit was hit,
//! an entry could not be read, or a path was seen twice.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Warning codes for traversal events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningCode {
    /// File was skipped because it exceeds the per-file size limit
    FileSkippedSize,
    /// The maximum number of files was reached
    FileLimitReached,
    /// The maximum accumulated size was reached
    TotalSizeLimitReached,
    /// A directory deeper than the depth limit was not descended into
    DepthLimitReached,
    /// An entry could not be read (permissions, broken link, vanished)
    EntryUnreadable,
    /// A path resolved to an already visited location
    DuplicatePath,
    /// Neither a regular file nor a directory
    UnsupportedEntry,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::FileSkippedSize => "FILE_SKIPPED_SIZE",
            WarningCode::FileLimitReached => "FILE_LIMIT_REACHED",
            WarningCode::TotalSizeLimitReached => "TOTAL_SIZE_LIMIT_REACHED",
            WarningCode::DepthLimitReached => "DEPTH_LIMIT_REACHED",
            WarningCode::EntryUnreadable => "ENTRY_UNREADABLE",
            WarningCode::DuplicatePath => "DUPLICATE_PATH",
            WarningCode::UnsupportedEntry => "UNSUPPORTED_ENTRY",
        }
    }

    /// Whether this code reports a global limit (recorded at most once per scan)
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            WarningCode::FileLimitReached
                | WarningCode::TotalSizeLimitReached
                | WarningCode::DepthLimitReached
        )
    }
}

/// A structured warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Warning code
    pub code: WarningCode,

    /// Human readable message
    pub message: String,

    /// Associated path relative to the traversal root (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ScanWarning {
    /// Create a new warning
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Set the path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
