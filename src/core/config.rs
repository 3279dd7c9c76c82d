//! Traversal limits
//!
//! Every limit degrades the digest rather than failing it: offending entries
//! are skipped and a warning is recorded.

use serde::{Deserialize, Serialize};

use crate::core::util::format_size;

/// Default maximum size of a single file (10 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default maximum accumulated size of all admitted files (500 MB)
pub const DEFAULT_MAX_TOTAL_SIZE: u64 = 500 * 1024 * 1024;

/// Default maximum number of admitted files
pub const DEFAULT_MAX_FILES: u64 = 10_000;

/// Default maximum directory depth below the root
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Limits applied during one traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanLimits {
    /// Files larger than this are skipped (bytes)
    pub max_file_size: u64,

    /// Files that would push the running total past this are skipped (bytes)
    pub max_total_size: u64,

    /// Files beyond this count are skipped
    pub max_files: u64,

    /// Directories deeper than this are kept but not descended into
    pub max_depth: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_total_size: DEFAULT_MAX_TOTAL_SIZE,
            max_files: DEFAULT_MAX_FILES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Human readable view of [`ScanLimits`] for reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitsReport {
    pub max_file_size: String,
    pub max_total_size: String,
    pub max_files: u64,
    pub max_directory_depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_input_tokens: Option<usize>,
}

impl ScanLimits {
    pub fn report(&self, max_input_tokens: Option<usize>) -> LimitsReport {
        LimitsReport {
            max_file_size: format_size(self.max_file_size),
            max_total_size: format_size(self.max_total_size),
            max_files: self.max_files,
            max_directory_depth: self.max_depth,
            max_input_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = ScanLimits::default();
        assert_eq!(limits.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(limits.max_total_size, DEFAULT_MAX_TOTAL_SIZE);
        assert_eq!(limits.max_files, 10_000);
        assert_eq!(limits.max_depth, 20);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let limits: ScanLimits = serde_json::from_str(r#"{"max_files": 5}"#).unwrap();
        assert_eq!(limits.max_files, 5);
        assert_eq!(limits.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_report() {
        let report = ScanLimits::default().report(Some(250_000));
        assert_eq!(report.max_file_size, "10.0 MB");
        assert_eq!(report.max_total_size, "500.0 MB");
        assert_eq!(report.max_input_tokens, Some(250_000));
    }
}
