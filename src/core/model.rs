//! Filesystem Node Model
//!
//! The digest is built from a tree of [`FileSystemNode`]s. The tree is
//! produced fully populated and sorted by the scanner and is read-only
//! afterwards; renderers only walk it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::file_reader::{is_text_file, read_text};
use crate::core::notebook::{default_transformers, ContentTransformers};
use crate::core::paths::{is_hidden_name, local_slug};
use crate::core::warning::ScanWarning;

/// Banner framing each file header in the content dump (48 `=` and a newline)
pub const SEPARATOR: &str = "================================================\n";

/// Content placeholder for binary files
pub const NON_TEXT_PLACEHOLDER: &str = "[Non-text file]";

/// The kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// One entry of the digested tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSystemNode {
    /// Base name (the root may carry a display name instead)
    pub name: String,

    pub kind: NodeKind,

    /// Location on disk
    #[serde(skip)]
    pub path: PathBuf,

    /// Path relative to the traversal root, using '/' as separator
    pub relative_path: String,

    /// Own size for files, sum of descendant file sizes for directories
    pub size: u64,

    /// Number of file descendants (1 for a file)
    pub file_count: u64,

    /// Number of directory descendants
    pub dir_count: u64,

    /// Distance from the traversal root
    pub depth: usize,

    /// Sorted children (always empty for files)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileSystemNode>,
}

impl FileSystemNode {
    /// Create an empty directory node
    pub fn directory(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        relative_path: impl Into<String>,
        depth: usize,
    ) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            path: path.into(),
            relative_path: relative_path.into(),
            size: 0,
            file_count: 0,
            dir_count: 0,
            depth,
            children: Vec::new(),
        }
    }

    /// Create a file node
    pub fn file(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        relative_path: impl Into<String>,
        size: u64,
        depth: usize,
    ) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            path: path.into(),
            relative_path: relative_path.into(),
            size,
            file_count: 1,
            dir_count: 0,
            depth,
            children: Vec::new(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Reorder children canonically
    ///
    /// Order: README.md (any case), regular files, dot-files, regular
    /// directories, dot-directories. Each group is sorted by name, compared
    /// byte-wise.
    pub fn sort_children(&mut self) {
        let mut readme = Vec::new();
        let mut files = Vec::new();
        let mut hidden_files = Vec::new();
        let mut dirs = Vec::new();
        let mut hidden_dirs = Vec::new();

        for child in std::mem::take(&mut self.children) {
            let hidden = is_hidden_name(&child.name);
            match child.kind {
                NodeKind::File if child.name.eq_ignore_ascii_case("readme.md") => {
                    readme.push(child)
                }
                NodeKind::File if hidden => hidden_files.push(child),
                NodeKind::File => files.push(child),
                NodeKind::Directory if hidden => hidden_dirs.push(child),
                NodeKind::Directory => dirs.push(child),
            }
        }

        for group in [
            &mut readme,
            &mut files,
            &mut hidden_files,
            &mut dirs,
            &mut hidden_dirs,
        ] {
            group.sort_by(|a, b| a.name.cmp(&b.name));
        }

        readme.extend(files);
        readme.extend(hidden_files);
        readme.extend(dirs);
        readme.extend(hidden_dirs);
        self.children = readme;
    }

    /// Textual content of a file, using the default transformers
    pub fn content(&self) -> String {
        self.content_with(default_transformers())
    }

    /// Textual content of a file
    ///
    /// Binary files yield [`NON_TEXT_PLACEHOLDER`] without any decode attempt.
    /// Files with a registered transformer are converted by it, and a failing
    /// transformer yields an inline error line. Everything else goes through
    /// the encoding-fallback reader. Directories have no content of their own.
    pub fn content_with(&self, transformers: &ContentTransformers) -> String {
        match self.kind {
            NodeKind::Directory => String::new(),
            NodeKind::File => {
                if !is_text_file(&self.path) {
                    return NON_TEXT_PLACEHOLDER.to_string();
                }

                if let Some(transformer) = transformers.for_path(&self.path) {
                    return match transformer.transform(&self.path) {
                        Ok(text) => text,
                        Err(e) => {
                            log::debug!(
                                "{} failed on {}: {}",
                                transformer.label(),
                                self.relative_path,
                                e
                            );
                            format!("Error processing {}: {}", transformer.label(), e)
                        }
                    };
                }

                read_text(&self.path)
            }
        }
    }

    /// Framed content block, using the default transformers
    pub fn content_block(&self) -> String {
        self.content_block_with(default_transformers())
    }

    /// Header banner plus content, the unit concatenated into the content dump
    pub fn content_block_with(&self, transformers: &ContentTransformers) -> String {
        format!(
            "{sep}File: {path}\n{sep}{content}\n\n",
            sep = SEPARATOR,
            path = self.relative_path,
            content = self.content_with(transformers)
        )
    }
}

/// Where the digested directory came from
///
/// Filled in by whoever located the directory: a local path, or a clone of a
/// remote repository with its user/repo/revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,

    /// Subdirectory of the repository being digested ("/" for the whole repo)
    pub subpath: String,

    /// Display label
    pub slug: String,
}

impl SourceMeta {
    /// Metadata for a plain local directory
    pub fn local(path: &Path) -> Self {
        Self {
            subpath: "/".to_string(),
            slug: local_slug(path),
            ..Default::default()
        }
    }

    /// Metadata for a repository identified by user and name
    pub fn remote(user_name: impl Into<String>, repo_name: impl Into<String>) -> Self {
        let user_name = user_name.into();
        let repo_name = repo_name.into();
        Self {
            slug: format!("{}-{}", user_name, repo_name),
            user_name: Some(user_name),
            repo_name: Some(repo_name),
            subpath: "/".to_string(),
            ..Default::default()
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    pub fn with_subpath(mut self, subpath: impl Into<String>) -> Self {
        self.subpath = subpath.into();
        self
    }

    /// `Repository: user/repo` for remote sources, `Directory: slug` otherwise
    pub fn identity_line(&self) -> String {
        match (&self.user_name, &self.repo_name) {
            (Some(user), Some(repo)) => format!("Repository: {}/{}", user, repo),
            _ => format!("Directory: {}", self.slug),
        }
    }

    /// Commit line, else branch line unless the branch is main/master
    pub fn revision_line(&self) -> Option<String> {
        if let Some(commit) = &self.commit {
            return Some(format!("Commit: {}", commit));
        }
        match self.branch.as_deref() {
            Some("main") | Some("master") | None => None,
            Some(branch) => Some(format!("Branch: {}", branch)),
        }
    }

    /// Whether the digest covers the repository root
    pub fn is_root_subpath(&self) -> bool {
        self.subpath.is_empty() || self.subpath == "/"
    }
}

/// The three rendered sections plus their diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub summary: String,
    pub tree: String,
    pub content: String,

    /// Token count of the rendered text, `None` when it could not be computed
    pub estimated_tokens: Option<usize>,

    pub warnings: Vec<ScanWarning>,
}

impl Digest {
    /// Warning messages as plain strings
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file(name: &str) -> FileSystemNode {
        FileSystemNode::file(name, name, name, 0, 1)
    }

    fn dir(name: &str) -> FileSystemNode {
        FileSystemNode::directory(name, name, name, 1)
    }

    fn names(node: &FileSystemNode) -> Vec<&str> {
        node.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_separator_width() {
        assert_eq!(SEPARATOR.len(), 49);
        assert!(SEPARATOR.trim_end_matches('\n').chars().all(|c| c == '='));
    }

    #[test]
    fn test_sort_children_canonical_order() {
        let mut root = FileSystemNode::directory("root", "root", "", 0);
        root.children = vec![
            dir("Sub"),
            file(".hidden"),
            file("b.txt"),
            dir(".config"),
            file("README.md"),
            file("a.txt"),
        ];
        root.sort_children();
        assert_eq!(
            names(&root),
            vec!["README.md", "a.txt", "b.txt", ".hidden", "Sub", ".config"]
        );
    }

    #[test]
    fn test_sort_children_readme_any_case_first() {
        let mut root = FileSystemNode::directory("root", "root", "", 0);
        root.children = vec![file("a.txt"), file("ReadMe.MD")];
        root.sort_children();
        assert_eq!(names(&root), vec!["ReadMe.MD", "a.txt"]);
    }

    #[test]
    fn test_sort_children_readme_directory_is_not_special() {
        let mut root = FileSystemNode::directory("root", "root", "", 0);
        root.children = vec![dir("readme.md"), file("z.txt")];
        root.sort_children();
        assert_eq!(names(&root), vec!["z.txt", "readme.md"]);
    }

    #[test]
    fn test_sort_children_case_sensitive() {
        let mut root = FileSystemNode::directory("root", "root", "", 0);
        root.children = vec![file("b"), file("B"), file("a"), file("A")];
        root.sort_children();
        assert_eq!(names(&root), vec!["A", "B", "a", "b"]);
    }

    #[test]
    fn test_sort_children_idempotent() {
        let mut root = FileSystemNode::directory("root", "root", "", 0);
        root.children = vec![
            dir("z"),
            file(".b"),
            file("readme.md"),
            dir(".a"),
            file("c"),
        ];
        root.sort_children();
        let once = root.clone();
        root.sort_children();
        assert_eq!(root, once);
    }

    #[test]
    fn test_binary_content_is_placeholder() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("z.bin");
        fs::write(&path, [0x00, 0x01]).unwrap();

        let node = FileSystemNode::file("z.bin", &path, "sub/z.bin", 2, 2);
        assert_eq!(node.content(), NON_TEXT_PLACEHOLDER);
    }

    #[test]
    fn test_text_content_and_block() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.txt");
        fs::write(&path, "hi").unwrap();

        let node = FileSystemNode::file("a.txt", &path, "a.txt", 2, 1);
        assert_eq!(node.content(), "hi");
        assert_eq!(
            node.content_block(),
            format!("{0}File: a.txt\n{0}hi\n\n", SEPARATOR)
        );
    }

    #[test]
    fn test_broken_notebook_is_inline_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nb.ipynb");
        fs::write(&path, "{ broken").unwrap();

        let node = FileSystemNode::file("nb.ipynb", &path, "nb.ipynb", 8, 1);
        assert!(node.content().starts_with("Error processing notebook: "));
    }

    #[test]
    fn test_notebook_without_transformer_is_read_verbatim() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nb.ipynb");
        fs::write(&path, "{ broken").unwrap();

        let node = FileSystemNode::file("nb.ipynb", &path, "nb.ipynb", 8, 1);
        assert_eq!(node.content_with(&ContentTransformers::empty()), "{ broken");
    }

    #[test]
    fn test_directory_has_no_content() {
        let temp = TempDir::new().unwrap();
        let node = FileSystemNode::directory("d", temp.path(), "d", 1);
        assert_eq!(node.content(), "");
    }

    #[test]
    fn test_source_meta_lines() {
        let local = SourceMeta::local(Path::new("/home/me/project"));
        assert_eq!(local.identity_line(), "Directory: me/project");
        assert_eq!(local.revision_line(), None);
        assert!(local.is_root_subpath());

        let remote = SourceMeta::remote("octo", "demo").with_branch("dev");
        assert_eq!(remote.identity_line(), "Repository: octo/demo");
        assert_eq!(remote.revision_line().as_deref(), Some("Branch: dev"));

        let pinned = remote.with_commit("abc123");
        assert_eq!(pinned.revision_line().as_deref(), Some("Commit: abc123"));
    }

    #[test]
    fn test_main_and_master_branches_are_omitted() {
        let main = SourceMeta::remote("o", "r").with_branch("main");
        let master = SourceMeta::remote("o", "r").with_branch("master");
        assert_eq!(main.revision_line(), None);
        assert_eq!(master.revision_line(), None);
    }
}
