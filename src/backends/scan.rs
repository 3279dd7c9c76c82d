//! Tree builder
//!
//! Walks a directory with walkdir (following symlinks) and builds the sorted
//! [`FileSystemNode`] tree. Nodes live in an index arena while the walk runs so
//! aggregates can be pushed up the parent chain as each entry is admitted; the
//! arena is frozen into an owning tree once the walk ends.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::backends::filter::ExcludeFilter;
use crate::core::config::ScanLimits;
use crate::core::error::{DigestError, Result};
use crate::core::model::FileSystemNode;
use crate::core::paths::{base_name, make_relative, normalize_path};
use crate::core::util::format_size;
use crate::core::warning::{ScanWarning, WarningCode};

/// Options for one traversal
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub limits: ScanLimits,
    pub filter: ExcludeFilter,
    /// Display name of the root node; defaults to the root's base name
    pub root_name: Option<String>,
}

/// Running statistics of one traversal
#[derive(Debug, Default)]
pub struct FileSystemStats {
    /// Canonical locations already seen
    pub visited: HashSet<PathBuf>,
    pub total_files: u64,
    pub total_size: u64,
}

impl FileSystemStats {
    /// Record a location; false when it was already visited
    pub fn mark_visited(&mut self, path: &Path) -> bool {
        let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.visited.insert(canonical)
    }
}

/// Result of a traversal
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub root: FileSystemNode,
    pub warnings: Vec<ScanWarning>,
    pub total_files: u64,
    pub total_size: u64,
}

struct ArenaNode {
    node: FileSystemNode,
    /// `None` when attached directly to the root
    parent: Option<usize>,
}

struct TreeBuilder {
    root: FileSystemNode,
    arena: Vec<ArenaNode>,
    warnings: Vec<ScanWarning>,
}

impl TreeBuilder {
    fn new(root: FileSystemNode) -> Self {
        Self {
            root,
            arena: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add a node below `parent` and propagate its counts to every ancestor
    fn attach(&mut self, parent: Option<usize>, node: FileSystemNode) -> usize {
        let (size, files, dirs) = if node.is_file() {
            (node.size, 1, 0)
        } else {
            (0, 0, 1)
        };

        let mut cursor = parent;
        while let Some(idx) = cursor {
            let ancestor = &mut self.arena[idx];
            ancestor.node.size += size;
            ancestor.node.file_count += files;
            ancestor.node.dir_count += dirs;
            cursor = ancestor.parent;
        }
        self.root.size += size;
        self.root.file_count += files;
        self.root.dir_count += dirs;

        self.arena.push(ArenaNode { node, parent });
        self.arena.len() - 1
    }

    /// Record a warning; limit warnings are kept once per scan
    fn warn(&mut self, warning: ScanWarning) {
        if warning.code.is_limit() && self.warnings.iter().any(|w| w.code == warning.code) {
            return;
        }
        log::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Turn the arena into an owning tree
    ///
    /// Children always sit at higher indices than their parent, so popping
    /// from the back completes (and sorts) every directory before it is
    /// moved into its parent.
    fn freeze(mut self) -> (FileSystemNode, Vec<ScanWarning>) {
        while let Some(mut entry) = self.arena.pop() {
            entry.node.sort_children();
            match entry.parent {
                Some(idx) => self.arena[idx].node.children.push(entry.node),
                None => self.root.children.push(entry.node),
            }
        }
        self.root.sort_children();
        (self.root, self.warnings)
    }
}

/// Build the tree rooted at `root`
///
/// Only a missing or unreadable root is an error; every other problem is
/// skipped and reported as a warning.
pub fn scan_tree(root: &Path, options: &ScanOptions) -> Result<ScanOutcome> {
    if !root.exists() {
        return Err(DigestError::RootNotFound(root.to_path_buf()));
    }
    let root = fs::canonicalize(root).map_err(|source| DigestError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    fs::read_dir(&root).map_err(|source| DigestError::RootUnreadable {
        path: root.clone(),
        source,
    })?;

    let limits = options.limits;
    let filter = &options.filter;
    let name = options
        .root_name
        .clone()
        .unwrap_or_else(|| base_name(&root));

    let mut stats = FileSystemStats::default();
    stats.mark_visited(&root);

    let mut builder = TreeBuilder::new(FileSystemNode::directory(name, root.clone(), "", 0));
    // Open directories by depth; index 0 is the root
    let mut open: Vec<Option<usize>> = vec![None];

    let mut walker = WalkDir::new(&root)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            let excluded = filter.is_excluded(relative, entry.file_type().is_dir());
            if excluded {
                log::debug!("Excluded {}", normalize_path(relative));
            }
            !excluded
        });

    while let Some(next) = walker.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(err) => {
                let location = err
                    .path()
                    .map(|p| relative_to(p, &root))
                    .unwrap_or_default();
                let warning = if let Some(ancestor) = err.loop_ancestor() {
                    ScanWarning::new(
                        WarningCode::DuplicatePath,
                        format!(
                            "Skipping {}: symlink loop back to {}",
                            location,
                            ancestor.display()
                        ),
                    )
                } else {
                    ScanWarning::new(
                        WarningCode::EntryUnreadable,
                        format!("Cannot read {}: {}", location, err),
                    )
                };
                builder.warn(warning.with_path(location));
                continue;
            }
        };

        let depth = entry.depth();
        open.truncate(depth);
        if depth == 0 || open.len() != depth {
            continue;
        }
        let parent = open[depth - 1];

        let relative = relative_to(entry.path(), &root);
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type();

        if !file_type.is_dir() && !file_type.is_file() {
            builder.warn(
                ScanWarning::new(
                    WarningCode::UnsupportedEntry,
                    format!("Skipping {}: not a regular file or directory", relative),
                )
                .with_path(relative),
            );
            continue;
        }

        if file_type.is_file() && !filter.is_included_file(Path::new(&relative)) {
            log::debug!("Not included {}", relative);
            continue;
        }

        if !stats.mark_visited(entry.path()) {
            if file_type.is_dir() {
                walker.skip_current_dir();
            }
            builder.warn(
                ScanWarning::new(
                    WarningCode::DuplicatePath,
                    format!("Skipping {}: already visited", relative),
                )
                .with_path(relative),
            );
            continue;
        }

        if file_type.is_dir() {
            let node = FileSystemNode::directory(name, entry.path(), relative.as_str(), depth);
            let idx = builder.attach(parent, node);
            if depth > limits.max_depth {
                walker.skip_current_dir();
                builder.warn(
                    ScanWarning::new(
                        WarningCode::DepthLimitReached,
                        format!("Maximum directory depth ({}) reached", limits.max_depth),
                    )
                    .with_path(relative),
                );
            } else {
                open.push(Some(idx));
            }
            continue;
        }

        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(err) => {
                builder.warn(
                    ScanWarning::new(
                        WarningCode::EntryUnreadable,
                        format!("Cannot read {}: {}", relative, err),
                    )
                    .with_path(relative),
                );
                continue;
            }
        };

        if size > limits.max_file_size {
            builder.warn(
                ScanWarning::new(
                    WarningCode::FileSkippedSize,
                    format!(
                        "Skipping file {} ({}): exceeds maximum file size {}",
                        relative,
                        format_size(size),
                        format_size(limits.max_file_size)
                    ),
                )
                .with_path(relative),
            );
            continue;
        }

        if stats.total_files + 1 > limits.max_files {
            builder.warn(
                ScanWarning::new(
                    WarningCode::FileLimitReached,
                    format!("Maximum file limit ({}) reached", limits.max_files),
                )
                .with_path(relative),
            );
            continue;
        }

        if stats.total_size + size > limits.max_total_size {
            builder.warn(
                ScanWarning::new(
                    WarningCode::TotalSizeLimitReached,
                    format!(
                        "Maximum total size limit ({}) reached",
                        format_size(limits.max_total_size)
                    ),
                )
                .with_path(relative),
            );
            continue;
        }

        stats.total_files += 1;
        stats.total_size += size;
        builder.attach(
            parent,
            FileSystemNode::file(name, entry.path(), relative, size, depth),
        );
    }

    let (root_node, warnings) = builder.freeze();
    log::info!(
        "Scanned {}: {} files, {}",
        root.display(),
        stats.total_files,
        format_size(stats.total_size)
    );

    Ok(ScanOutcome {
        root: root_node,
        warnings,
        total_files: stats.total_files,
        total_size: stats.total_size,
    })
}

fn relative_to(path: &Path, root: &Path) -> String {
    make_relative(path, root).unwrap_or_else(|| normalize_path(path))
}
