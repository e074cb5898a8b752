//! Lexical path helpers
//!
//! Project paths are identities: two spellings of the same file (`a/../b/B.csproj`
//! and `b/B.csproj`) must compare equal, even when the file does not exist yet.
//! Nothing here touches the filesystem except [`absolute`], which reads the
//! current directory.

use std::cmp::Ordering;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving `.` and `..` components without requiring the file to exist.
///
/// Unlike `std::fs::canonicalize`, this does not follow symlinks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Makes `path` absolute against the current directory and normalizes it.
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize_path(path))
    } else {
        Ok(normalize_path(&std::env::current_dir()?.join(path)))
    }
}

/// Path of `path` relative to `root`, using `/` separators.
///
/// Paths outside `root` (or an empty `root`) are rendered unchanged.
pub fn relative_display(path: &Path, root: &Path) -> String {
    let relative = if root.as_os_str().is_empty() {
        path
    } else {
        path.strip_prefix(root).unwrap_or(path)
    };

    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Containing directory of `path` relative to `root`, always ending in `/`.
///
/// A file directly inside `root` yields `./`.
pub fn directory_relative_display(path: &Path, root: &Path) -> String {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let relative = relative_display(parent, root);
    if relative.is_empty() {
        "./".to_string()
    } else if relative.ends_with('/') {
        relative
    } else {
        format!("{}/", relative)
    }
}

/// Case-insensitive comparison with a literal tiebreaker.
///
/// Gives the same total order on every platform regardless of filesystem case
/// sensitivity.
pub fn compare_paths(a: &Path, b: &Path) -> Ordering {
    let a = a.to_string_lossy();
    let b = b.to_string_lossy();
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(&b))
}

/// Whether `file_name` ends with `.{extension}`, ignoring ASCII case.
pub fn has_extension(file_name: &str, extension: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}
