//! Expansion of `<ProjectReference Include="...">` values into descriptor paths.
//!
//! Rules, first match wins:
//!
//! 1. `prefix/**/*.csproj` (any `**` segment and a `*.<ext>` tail): every
//!    descriptor with that extension anywhere under `prefix`
//! 2. `dir/*.csproj` with a literal `dir`: descriptors directly in `dir`
//! 3. `*.csproj`: descriptors directly in the base directory
//! 4. anything else with `*`, `?` or `[`: generic glob against the base directory
//! 5. a literal path joined to the base directory
//!
//! Backslashes are treated as separators. Missing directories expand to nothing.

use crate::util::paths::{has_extension, normalize_path};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions recognized as project descriptors.
pub const DESCRIPTOR_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj"];

const GLOB_METACHARACTERS: &[char] = &['*', '?', '['];

/// Whether `file_name` has one of the [`DESCRIPTOR_EXTENSIONS`].
pub fn is_descriptor_file(file_name: &str) -> bool {
    DESCRIPTOR_EXTENSIONS
        .iter()
        .any(|ext| has_extension(file_name, ext))
}

/// Turns a raw include into the ordered, de-duplicated list of paths to load.
pub fn expand_include(base_dir: &Path, include: &str) -> Vec<PathBuf> {
    let include = include.trim().replace('\\', "/");

    let mut paths = match classify(&include) {
        IncludePattern::Recursive { prefix, extension } => {
            list_recursive(&base_dir.join(prefix), extension)
        }
        IncludePattern::Directory { dir, extension } => {
            list_in_dir(&base_dir.join(dir), extension)
        }
        IncludePattern::Glob => glob_files(base_dir, &include),
        IncludePattern::Literal => vec![base_dir.join(&include)],
    };

    for path in paths.iter_mut() {
        *path = normalize_path(path);
    }
    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    paths.dedup();

    debug!(
        base = %base_dir.display(),
        include = %include,
        matches = paths.len(),
        "Expanded project reference"
    );
    paths
}

#[derive(Debug, PartialEq, Eq)]
enum IncludePattern<'a> {
    Recursive { prefix: String, extension: &'a str },
    Directory { dir: &'a str, extension: &'a str },
    Glob,
    Literal,
}

fn classify(include: &str) -> IncludePattern<'_> {
    let segments: Vec<&str> = include.split('/').collect();
    let tail_extension = segments.last().copied().and_then(descriptor_wildcard);

    if let Some(extension) = tail_extension {
        if let Some(pos) = segments.iter().position(|s| *s == "**") {
            if pos + 1 < segments.len() {
                return IncludePattern::Recursive {
                    prefix: segments[..pos].join("/"),
                    extension,
                };
            }
        }

        if segments.len() == 1 {
            return IncludePattern::Directory {
                dir: ".",
                extension,
            };
        }

        let dir = &include[..include.len() - segments[segments.len() - 1].len() - 1];
        if !dir.contains(GLOB_METACHARACTERS) {
            return IncludePattern::Directory { dir, extension };
        }
    }

    if include.contains(GLOB_METACHARACTERS) {
        IncludePattern::Glob
    } else {
        IncludePattern::Literal
    }
}

/// `csproj` for a `*.csproj` segment, `None` for anything else.
fn descriptor_wildcard(segment: &str) -> Option<&str> {
    let extension = segment.strip_prefix("*.")?;
    DESCRIPTOR_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(extension))
        .then_some(extension)
}

fn list_recursive(dir: &Path, extension: &str) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| has_extension(name, extension))
        })
        .map(|entry| entry.into_path())
        .collect()
}

fn list_in_dir(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| has_extension(name, extension))
        })
        .map(|entry| entry.path())
        .collect()
}

fn glob_files(base_dir: &Path, include: &str) -> Vec<PathBuf> {
    let base = glob::Pattern::escape(&base_dir.to_string_lossy());
    let pattern = format!("{}/{}", base.trim_end_matches('/'), include);

    match glob::glob(&pattern) {
        Ok(paths) => paths
            .filter_map(|p| p.ok())
            .filter(|p| p.is_file())
            .collect(),
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "Invalid project reference pattern");
            Vec::new()
        }
    }
}
