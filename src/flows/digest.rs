//! Digest flow - Turn a local directory (or a single file) into a digest
//!
//! Runs the traversal, then renders the summary, tree and content sections
//! and estimates the token count of the rendered text.

use std::fs;
use std::path::{Path, PathBuf};

use crate::backends::filter::ExcludeFilter;
use crate::backends::scan::{scan_tree, ScanOptions};
use crate::core::config::ScanLimits;
use crate::core::error::{DigestError, Result};
use crate::core::formatters::{
    directory_summary, files_content, push_token_line, single_file_summary, single_file_tree,
    tree_diagram,
};
use crate::core::model::{Digest, FileSystemNode, SourceMeta};
use crate::core::notebook::default_transformers;
use crate::core::paths::base_name;
use crate::core::tokenizer::{try_count_tokens, TokenModel};

/// Options for one digest
#[derive(Debug, Clone)]
pub struct DigestOptions {
    /// Directory or file to digest
    pub root: PathBuf,
    /// Where the root came from
    pub source: SourceMeta,
    pub limits: ScanLimits,
    pub filter: ExcludeFilter,
    /// Display name of the root directory (defaults to its base name)
    pub root_name: Option<String>,
    /// Token model for the estimate (default: cl100k)
    pub token_model: TokenModel,
}

impl DigestOptions {
    /// Options for a local path with default limits and exclusions
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            source: SourceMeta::local(&root),
            root,
            limits: ScanLimits::default(),
            filter: ExcludeFilter::default(),
            root_name: None,
            token_model: TokenModel::default(),
        }
    }
}

/// Build the digest described by `options`
pub fn ingest(options: &DigestOptions) -> Result<Digest> {
    if !options.root.exists() {
        return Err(DigestError::RootNotFound(options.root.clone()));
    }

    if options.root.is_file() {
        ingest_file(options)
    } else {
        ingest_directory(options)
    }
}

fn ingest_directory(options: &DigestOptions) -> Result<Digest> {
    let scan_options = ScanOptions {
        limits: options.limits,
        filter: options.filter.clone(),
        root_name: options.root_name.clone(),
    };
    let outcome = scan_tree(&options.root, &scan_options)?;

    let tree = tree_diagram(&outcome.root);
    let content = files_content(&outcome.root, default_transformers());
    let estimated_tokens = try_count_tokens(&format!("{}{}", tree, content), options.token_model);

    let mut summary = directory_summary(&options.source, &outcome.root);
    push_token_line(&mut summary, estimated_tokens);

    Ok(Digest {
        summary,
        tree,
        content,
        estimated_tokens,
        warnings: outcome.warnings,
    })
}

fn ingest_file(options: &DigestOptions) -> Result<Digest> {
    let file = file_node(&options.root)?;

    let body = file.content();
    if body.is_empty() {
        return Err(DigestError::EmptyContent(file.name));
    }

    let content = file.content_block();
    let estimated_tokens = try_count_tokens(&content, options.token_model);

    let mut summary = single_file_summary(&options.source, &file, &body);
    push_token_line(&mut summary, estimated_tokens);

    Ok(Digest {
        summary,
        tree: single_file_tree(&file),
        content,
        estimated_tokens,
        warnings: Vec::new(),
    })
}

fn file_node(path: &Path) -> Result<FileSystemNode> {
    let unreadable = |source: std::io::Error| DigestError::RootUnreadable {
        path: path.to_path_buf(),
        source,
    };
    let resolved = fs::canonicalize(path).map_err(unreadable)?;
    let size = fs::metadata(&resolved).map_err(unreadable)?.len();
    let name = base_name(&resolved);

    Ok(FileSystemNode::file(name.clone(), resolved, name, size, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::SEPARATOR;
    use crate::core::warning::WarningCode;
    use tempfile::TempDir;

    fn scenario(base: &Path) -> PathBuf {
        let root = base.join("project");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), "hi").unwrap();
        fs::write(root.join("sub/z.bin"), [0x00, 0x01]).unwrap();
        root
    }

    #[test]
    fn test_ingest_directory() {
        let temp = TempDir::new().unwrap();
        let root = scenario(temp.path());

        let digest = ingest(&DigestOptions::new(&root)).unwrap();

        assert_eq!(
            digest.tree,
            "Directory structure:\n└── project/\n    ├── a.txt\n    └── sub/\n        └── z.bin\n"
        );
        assert!(digest.summary.contains("Files analyzed: 2\n\nEstimated tokens: "));
        assert!(digest.content.contains(&format!("{0}File: a.txt\n{0}hi\n\n", SEPARATOR)));
        assert!(digest.content.contains("File: sub/z.bin\n"));
        assert!(digest.content.contains("[Non-text file]"));
        assert!(digest.estimated_tokens.unwrap() > 0);
        assert!(digest.warnings.is_empty());
    }

    #[test]
    fn test_ingest_directory_with_source_meta() {
        let temp = TempDir::new().unwrap();
        let root = scenario(temp.path());

        let mut options = DigestOptions::new(&root);
        options.source = SourceMeta::remote("octo", "demo").with_branch("dev");
        let digest = ingest(&options).unwrap();

        assert!(digest
            .summary
            .starts_with("Repository: octo/demo\nBranch: dev\nFiles analyzed: 2\n"));
    }

    #[test]
    fn test_ingest_reports_limit_warnings() {
        let temp = TempDir::new().unwrap();
        let root = scenario(temp.path());

        let mut options = DigestOptions::new(&root);
        options.limits.max_files = 1;
        let digest = ingest(&options).unwrap();

        assert!(digest.summary.contains("Files analyzed: 1\n"));
        assert_eq!(digest.warnings.len(), 1);
        assert_eq!(digest.warnings[0].code, WarningCode::FileLimitReached);
    }

    #[test]
    fn test_ingest_single_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, "one\ntwo\nthree\n").unwrap();

        let digest = ingest(&DigestOptions::new(&path)).unwrap();

        assert!(digest.summary.contains("File: notes.txt\nLines: 3\n\nEstimated tokens: "));
        assert_eq!(digest.tree, "Directory structure:\n└── notes.txt");
        assert_eq!(
            digest.content,
            format!("{0}File: notes.txt\n{0}one\ntwo\nthree\n\n\n", SEPARATOR)
        );
    }

    #[test]
    fn test_ingest_empty_single_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.txt");
        fs::write(&path, "").unwrap();

        let err = ingest(&DigestOptions::new(&path)).unwrap_err();
        assert!(matches!(err, DigestError::EmptyContent(name) if name == "empty.txt"));
    }

    #[test]
    fn test_ingest_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = ingest(&DigestOptions::new(temp.path().join("nope"))).unwrap_err();
        assert!(matches!(err, DigestError::RootNotFound(_)));
    }
}
