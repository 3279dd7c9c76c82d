//! Path helpers
//!
//! Every path shown in a digest uses '/' as separator and is relative to the
//! traversal root.

use std::path::Path;

/// Render a path with '/' separators
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// `path` relative to `root`, or `None` when it lies elsewhere
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Dot-file / dot-directory name
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Whether the last component of `path` is hidden
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| is_hidden_name(&name.to_string_lossy()))
        .unwrap_or(false)
}

/// Base name of a path, or an empty string when it has none (e.g. `/`)
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<parent>/<name>` label used to identify a local directory
pub fn local_slug(path: &Path) -> String {
    let name = base_name(path);
    let parent = path.parent().map(base_name).unwrap_or_default();
    match (parent.is_empty(), name.is_empty()) {
        (_, true) => normalize_path(path),
        (true, false) => name,
        (false, false) => format!("{}/{}", parent, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_detection() {
        assert!(is_hidden_name(".env"));
        assert!(!is_hidden_name("env"));
        assert!(is_hidden(Path::new("docs/.draft.md")));
        assert!(!is_hidden(Path::new(".config/settings.toml")));
        assert!(!is_hidden(Path::new("/")));
    }

    #[test]
    fn test_relative_paths() {
        let root = Path::new("/work/repo");
        assert_eq!(
            make_relative(Path::new("/work/repo/sub/z.bin"), root).as_deref(),
            Some("sub/z.bin")
        );
        assert_eq!(make_relative(root, root).as_deref(), Some(""));
        assert_eq!(make_relative(Path::new("/elsewhere/a"), root), None);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(Path::new("/tmp/project")), "project");
        assert_eq!(base_name(Path::new("notes.txt")), "notes.txt");
        assert_eq!(base_name(Path::new("/")), "");
    }

    #[test]
    fn test_local_slug() {
        assert_eq!(local_slug(Path::new("/home/me/project")), "me/project");
        assert_eq!(local_slug(Path::new("/project")), "project");
        assert_eq!(local_slug(Path::new("/")), "/");
    }
}
