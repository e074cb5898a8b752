//! Repository root discovery

use crate::util::paths::absolute;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Walks up from `start` (a file or a directory) to the first directory
/// containing a `.git` directory.
pub fn find_repository_root(start: &Path) -> Option<PathBuf> {
    let start = absolute(start).ok()?;
    let mut current = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start
    };

    debug!(start = %current.display(), "Searching for repository root");
    loop {
        if current.join(".git").is_dir() {
            debug!(root = %current.display(), "Found repository root");
            return Some(current);
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => {
                debug!("Reached filesystem root without finding .git");
                return None;
            }
        }
    }
}
