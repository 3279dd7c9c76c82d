//! Entry filtering
//!
//! Gitignore-style exclude/include patterns plus an optional hidden-entry
//! filter, evaluated on root-relative paths before an entry is classified.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

use crate::core::error::{DigestError, Result};
use crate::core::paths::is_hidden;

/// Patterns excluded unless the caller opts out
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // Python
    "*.pyc",
    "*.pyo",
    "*.pyd",
    "__pycache__",
    ".pytest_cache",
    ".coverage",
    ".tox",
    ".nox",
    ".mypy_cache",
    ".ruff_cache",
    ".hypothesis",
    "poetry.lock",
    "Pipfile.lock",
    "*.egg-info",
    "*.egg",
    "*.whl",
    "site-packages",
    // JavaScript
    "node_modules",
    "bower_components",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    ".npm",
    ".yarn",
    ".pnpm-store",
    ".next",
    ".nuxt",
    ".docusaurus",
    "*.min.js",
    "*.min.css",
    "*.map",
    // JVM
    "*.class",
    "*.jar",
    "*.war",
    "*.ear",
    "*.nar",
    ".gradle",
    // Native artifacts
    "*.o",
    "*.obj",
    "*.so",
    "*.dll",
    "*.dylib",
    "*.exe",
    "*.lib",
    "*.out",
    "*.a",
    "*.pdb",
    // Rust
    "Cargo.lock",
    "*.rs.bk",
    // Ruby
    "*.gem",
    ".bundle",
    "Gemfile.lock",
    // Swift / Xcode
    ".build",
    "*.xcodeproj",
    "*.xcworkspace",
    "xcuserdata",
    ".swiftpm",
    // .NET
    "*.suo",
    "*.user",
    "*.nupkg",
    // Version control
    ".git",
    ".svn",
    ".hg",
    ".gitignore",
    ".gitattributes",
    ".gitmodules",
    // Media
    "*.svg",
    "*.png",
    "*.jpg",
    "*.jpeg",
    "*.gif",
    "*.ico",
    "*.pdf",
    "*.mov",
    "*.mp4",
    "*.mp3",
    "*.wav",
    // Virtual environments
    "venv",
    ".venv",
    "env",
    ".env",
    "virtualenv",
    // Editors and OS clutter
    ".idea",
    ".vscode",
    ".vs",
    "*.swp",
    "*.swo",
    "*.swn",
    "*.sublime-*",
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    // Temporary and cache files
    "*.log",
    "*.bak",
    "*.tmp",
    "*.temp",
    ".cache",
    ".sass-cache",
    ".eslintcache",
    // Build output
    "build",
    "dist",
    "target",
    "out",
    // Infrastructure state
    ".terraform",
    "*.tfstate*",
    "vendor",
];

/// Decides which entries take part in a scan
#[derive(Debug, Clone)]
pub struct ExcludeFilter {
    exclude: Gitignore,
    include: Option<Gitignore>,
    skip_hidden: bool,
}

impl ExcludeFilter {
    /// Build a filter from explicit patterns only
    pub fn new(exclude: &[String], include: &[String], skip_hidden: bool) -> Result<Self> {
        Ok(Self {
            exclude: build_matcher(exclude.iter().map(String::as_str))?,
            include: if include.is_empty() {
                None
            } else {
                Some(build_matcher(include.iter().map(String::as_str))?)
            },
            skip_hidden,
        })
    }

    /// Build a filter from [`DEFAULT_IGNORE_PATTERNS`] plus extra excludes
    pub fn with_defaults(extra_exclude: &[String], include: &[String], skip_hidden: bool) -> Result<Self> {
        let mut exclude: Vec<String> = DEFAULT_IGNORE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();
        exclude.extend(extra_exclude.iter().cloned());
        Self::new(&exclude, include, skip_hidden)
    }

    /// A filter that lets everything through
    pub fn allow_all() -> Self {
        Self {
            exclude: Gitignore::empty(),
            include: None,
            skip_hidden: false,
        }
    }

    /// Whether the entry at `relative` (relative to the scan root) is dropped
    ///
    /// `is_dir` comes from the directory listing, so patterns with a trailing
    /// `/` only match directories.
    pub fn is_excluded(&self, relative: &Path, is_dir: bool) -> bool {
        if self.skip_hidden && is_hidden(relative) {
            return true;
        }
        self.exclude.matched(relative, is_dir).is_ignore()
    }

    /// Whether a file passes the include patterns (always true without any)
    pub fn is_included_file(&self, relative: &Path) -> bool {
        match &self.include {
            None => true,
            Some(include) => include.matched(relative, false).is_ignore(),
        }
    }
}

impl Default for ExcludeFilter {
    fn default() -> Self {
        // The built-in patterns are all valid globs
        Self::with_defaults(&[], &[], false).unwrap_or_else(|_| Self::allow_all())
    }
}

fn build_matcher<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(".");
    for pattern in patterns {
        builder
            .add_line(None, pattern)
            .map_err(|e| DigestError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
    }
    builder.build().map_err(|e| DigestError::InvalidPattern {
        pattern: String::new(),
        message: e.to_string(),
    })
}
