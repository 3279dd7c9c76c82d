//! Digest section formatters
//!
//! Pure functions over a finished tree: the summary header, the ASCII tree
//! diagram, the concatenated content dump, and the token count label.

use crate::core::model::{FileSystemNode, NodeKind, SourceMeta};
use crate::core::notebook::ContentTransformers;
use crate::core::util::format_count;

/// Header line of every tree diagram
pub const TREE_HEADER: &str = "Directory structure:\n";

/// Summary for a directory digest, without the token line
pub fn directory_summary(meta: &SourceMeta, root: &FileSystemNode) -> String {
    let mut summary = format!("{}\n", meta.identity_line());

    if let Some(line) = meta.revision_line() {
        summary.push_str(&line);
        summary.push('\n');
    }

    if !meta.is_root_subpath() {
        summary.push_str(&format!("Subpath: {}\n", meta.subpath));
    }

    summary.push_str(&format!("Files analyzed: {}\n", root.file_count));
    summary
}

/// Summary for a single-file digest, without the token line
pub fn single_file_summary(meta: &SourceMeta, file: &FileSystemNode, content: &str) -> String {
    let mut summary = format!("{}\n", meta.identity_line());

    if let Some(line) = meta.revision_line() {
        summary.push_str(&line);
        summary.push('\n');
    }

    summary.push_str(&format!("File: {}\n", file.name));
    summary.push_str(&format!("Lines: {}\n", format_count(content.lines().count())));
    summary
}

/// Append the estimated token line to a summary
pub fn push_token_line(summary: &mut String, tokens: Option<usize>) {
    summary.push_str(&format!("\nEstimated tokens: {}", token_label(tokens)));
}

/// ASCII tree diagram of the whole tree, header included
///
/// A root without a name contributes no line of its own; its children then
/// start at the left margin.
pub fn tree_diagram(root: &FileSystemNode) -> String {
    let mut out = String::from(TREE_HEADER);
    write_tree(root, "", true, &mut out);
    out
}

/// One-line tree for single-file digests, without a trailing newline
pub fn single_file_tree(file: &FileSystemNode) -> String {
    format!("{}└── {}", TREE_HEADER, file.name)
}

fn write_tree(node: &FileSystemNode, prefix: &str, is_last: bool, out: &mut String) {
    let child_prefix = if node.name.is_empty() {
        prefix.to_string()
    } else {
        out.push_str(prefix);
        out.push_str(if is_last { "└── " } else { "├── " });
        out.push_str(&node.name);
        if node.is_dir() {
            out.push('/');
        }
        out.push('\n');
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };

    match node.kind {
        NodeKind::File => {}
        NodeKind::Directory => {
            let last = node.children.len().saturating_sub(1);
            for (idx, child) in node.children.iter().enumerate() {
                write_tree(child, &child_prefix, idx == last, out);
            }
        }
    }
}

/// Depth-first dump of every file's content block
///
/// Blocks of siblings are separated by a newline; directories without any
/// file below them contribute nothing.
pub fn files_content(node: &FileSystemNode, transformers: &ContentTransformers) -> String {
    match node.kind {
        NodeKind::File => node.content_block_with(transformers),
        NodeKind::Directory => node
            .children
            .iter()
            .map(|child| files_content(child, transformers))
            .filter(|block| !block.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render a token count: `999`, `1.2k`, `3.4M` (one decimal, truncated)
pub fn format_token_count(tokens: usize) -> String {
    if tokens > 1_000_000 {
        format!("{}.{}M", tokens / 1_000_000, (tokens % 1_000_000) / 100_000)
    } else if tokens >= 1_000 {
        format!("{}.{}k", tokens / 1_000, (tokens % 1_000) / 100)
    } else {
        tokens.to_string()
    }
}

/// Token label, `unknown` when the count could not be computed
pub fn token_label(tokens: Option<usize>) -> String {
    tokens
        .map(format_token_count)
        .unwrap_or_else(|| "unknown".to_string())
}
