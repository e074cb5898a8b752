//! Discovery of build context files that `dotnet restore` needs next to the
//! project descriptors: the repository `nuget.config` and every
//! `Directory.Build.props` / `Directory.Packages.props` between a project and
//! the repository root.

use super::graph::ProjectGraph;
use crate::generator::AdditionalFilePath;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const NUGET_CONFIG: &str = "nuget.config";
pub const DIRECTORY_BUILD_PROPS: &str = "Directory.Build.props";
pub const DIRECTORY_PACKAGES_PROPS: &str = "Directory.Packages.props";

const ANCESTOR_FILES: &[&str] = &[DIRECTORY_BUILD_PROPS, DIRECTORY_PACKAGES_PROPS];

/// Cache key for one directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectoryKey {
    pub directory: PathBuf,
    pub file_name: String,
}

/// Filesystem lookups memoized for a single locate call.
#[derive(Debug, Default)]
pub struct SearchCache {
    root_config: Option<Option<PathBuf>>,
    directory_files: HashMap<DirectoryKey, Vec<PathBuf>>,
    scans: usize,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of directory listings actually performed.
    pub fn scans(&self) -> usize {
        self.scans
    }

    /// First file named [`NUGET_CONFIG`] (any case) under `root`, walked once.
    pub fn root_config(&mut self, root: &Path) -> Option<PathBuf> {
        if let Some(found) = &self.root_config {
            return found.clone();
        }

        let found = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .find(|e| {
                e.file_type().is_file()
                    && e.file_name()
                        .to_str()
                        .is_some_and(|n| n.eq_ignore_ascii_case(NUGET_CONFIG))
            })
            .map(|e| e.into_path());

        debug!(root = %root.display(), found = ?found, "Searched for nuget.config");
        self.root_config = Some(found.clone());
        found
    }

    /// Files directly in `directory` whose name equals `file_name`, ignoring case.
    pub fn files_in(&mut self, directory: &Path, file_name: &str) -> Vec<PathBuf> {
        let key = DirectoryKey {
            directory: directory.to_path_buf(),
            file_name: file_name.to_string(),
        };
        if let Some(files) = self.directory_files.get(&key) {
            return files.clone();
        }

        self.scans += 1;
        let mut files: Vec<PathBuf> = match fs::read_dir(directory) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
                .filter(|e| {
                    e.file_name()
                        .to_str()
                        .is_some_and(|n| n.eq_ignore_ascii_case(file_name))
                })
                .map(|e| e.path())
                .collect(),
            Err(_) => Vec::new(),
        };
        files.sort();

        self.directory_files.insert(key, files.clone());
        files
    }

    /// Every `file_name` from `start` up to `root` inclusive, nearest first.
    pub fn ancestors(&mut self, start: &Path, root: &Path, file_name: &str) -> Vec<PathBuf> {
        let mut result = Vec::new();
        let mut current = start.to_path_buf();

        loop {
            result.extend(self.files_in(&current, file_name));

            if current == root {
                break;
            }
            match current.parent() {
                Some(parent) if parent != current => current = parent.to_path_buf(),
                _ => break,
            }
        }

        result
    }
}

/// Context files for every project in the closure of `graph`, first seen first.
pub fn locate_context_files(graph: &ProjectGraph, root: &Path) -> Vec<AdditionalFilePath> {
    let mut cache = SearchCache::new();
    locate_with_cache(graph, root, &mut cache)
}

pub fn locate_with_cache(
    graph: &ProjectGraph,
    root: &Path,
    cache: &mut SearchCache,
) -> Vec<AdditionalFilePath> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for project in graph.closure() {
        info!(path = %project.path.display(), "Looking for project context files");

        let directory = project.path.parent().unwrap_or(root);
        let mut found: Vec<PathBuf> = cache.root_config(root).into_iter().collect();
        for name in ANCESTOR_FILES {
            found.extend(cache.ancestors(directory, root, name));
        }

        for path in found {
            if seen.insert(path.clone()) {
                result.push(AdditionalFilePath::new(path, root.to_path_buf()));
            }
        }
    }

    debug!(files = result.len(), scans = cache.scans(), "Context files located");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn project(root: &Path, rel: &str, references: &[&str]) -> PathBuf {
        let refs: String = references
            .iter()
            .map(|r| format!(r#"<ProjectReference Include="{}" />"#, r))
            .collect();
        write(
            root,
            rel,
            &format!("<Project><ItemGroup>{}</ItemGroup></Project>", refs),
        )
    }

    fn relative(files: &[AdditionalFilePath]) -> Vec<String> {
        files.iter().map(|f| f.relative_path()).collect()
    }

    #[test]
    fn test_ancestor_found_once_and_cached() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, DIRECTORY_BUILD_PROPS, "<Project/>");
        let app = project(root, "src/App/App.csproj", &["../Other/Other.csproj"]);
        project(root, "src/Other/Other.csproj", &[]);

        let graph = ProjectGraph::resolve(&app, root).unwrap();
        let mut cache = SearchCache::new();
        let files = locate_with_cache(&graph, root, &mut cache);

        assert_eq!(relative(&files), vec![DIRECTORY_BUILD_PROPS]);

        // src/App, src, root for two names, then only src/Other for two names
        assert_eq!(cache.scans(), 8);
    }

    #[test]
    fn test_second_lookup_reuses_cache() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, DIRECTORY_BUILD_PROPS, "<Project/>");
        fs::create_dir_all(root.join("src/App")).unwrap();
        fs::create_dir_all(root.join("src/Other")).unwrap();

        let mut cache = SearchCache::new();
        let first = cache.ancestors(&root.join("src/App"), root, DIRECTORY_BUILD_PROPS);
        assert_eq!(first.len(), 1);
        assert_eq!(cache.scans(), 3);

        let second = cache.ancestors(&root.join("src/Other"), root, DIRECTORY_BUILD_PROPS);
        assert_eq!(second, first);
        assert_eq!(cache.scans(), 4);
    }

    #[test]
    fn test_walk_stops_at_root() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        write(dir.path(), DIRECTORY_BUILD_PROPS, "<Project/>");
        fs::create_dir_all(repo.join("App")).unwrap();

        let mut cache = SearchCache::new();
        let found = cache.ancestors(&repo.join("App"), &repo, DIRECTORY_BUILD_PROPS);
        assert!(found.is_empty());
        assert_eq!(cache.scans(), 2);
    }

    #[test]
    fn test_case_insensitive_names_nearest_first() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "directory.build.props", "<Project/>");
        write(root, "src/App/DIRECTORY.BUILD.PROPS", "<Project/>");
        write(root, "src/App/Directory.Build.props.bak", "");

        let mut cache = SearchCache::new();
        let found = cache.ancestors(&root.join("src/App"), root, DIRECTORY_BUILD_PROPS);
        assert_eq!(
            found,
            vec![
                root.join("src/App/DIRECTORY.BUILD.PROPS"),
                root.join("directory.build.props")
            ]
        );
    }

    #[test]
    fn test_nuget_config_anywhere_in_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "build/NuGet.Config", "<configuration/>");
        let app = project(root, "src/App/App.csproj", &[]);

        let graph = ProjectGraph::resolve(&app, root).unwrap();
        let files = locate_context_files(&graph, root);
        assert_eq!(relative(&files), vec!["build/NuGet.Config"]);
    }

    #[test]
    fn test_root_config_walked_once() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, NUGET_CONFIG, "<configuration/>");

        let mut cache = SearchCache::new();
        let first = cache.root_config(root);
        fs::remove_file(root.join(NUGET_CONFIG)).unwrap();
        assert_eq!(cache.root_config(root), first);
    }

    #[test]
    fn test_merge_order_and_dedup() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, NUGET_CONFIG, "<configuration/>");
        write(root, DIRECTORY_BUILD_PROPS, "<Project/>");
        write(root, DIRECTORY_PACKAGES_PROPS, "<Project/>");
        write(root, "src/Lib/Directory.Build.props", "<Project/>");
        let app = project(root, "src/App/App.csproj", &["../Lib/Lib.csproj"]);
        project(root, "src/Lib/Lib.csproj", &[]);

        let graph = ProjectGraph::resolve(&app, root).unwrap();
        let files = locate_context_files(&graph, root);
        assert_eq!(
            relative(&files),
            vec![
                NUGET_CONFIG,
                DIRECTORY_BUILD_PROPS,
                DIRECTORY_PACKAGES_PROPS,
                "src/Lib/Directory.Build.props",
            ]
        );
        assert_eq!(files[3].directory_relative_path(), "src/Lib/");
        assert_eq!(files[0].directory_relative_path(), "./");
    }

    #[test]
    fn test_no_context_files() {
        let dir = TempDir::new().unwrap();
        let app = project(dir.path(), "App.csproj", &[]);
        let graph = ProjectGraph::resolve(&app, dir.path()).unwrap();
        assert!(locate_context_files(&graph, dir.path()).is_empty());
    }
}
