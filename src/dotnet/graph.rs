//! Project reference graph.
//!
//! Descriptors live in an arena owned by [`ProjectGraph`] and addressed by
//! [`ProjectId`]; reference edges are id lists. Resolution is an explicit
//! worklist instead of recursion, so arbitrarily deep reference chains cannot
//! overflow the stack. The worklist *is* the active resolution path: a
//! reference to a descriptor that still has a frame on it is a cycle, while a
//! reference to an already finished descriptor simply reuses its node.

use super::descriptor::{parse_descriptor, PackageReference, ProjectProperties};
use super::error::ProjectError;
use super::pattern::expand_include;
use crate::util::paths::{absolute, compare_paths, directory_relative_display, relative_display};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::vec;
use tracing::{debug, info, warn};

/// Stable index of a project inside a [`ProjectGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(usize);

/// One resolved descriptor.
#[derive(Debug, Clone)]
pub struct ProjectNode {
    /// Absolute, normalized descriptor path; unique within a graph
    pub path: PathBuf,
    /// Repository root used for display paths
    pub root_path: PathBuf,
    pub package_references: Vec<PackageReference>,
    /// Direct references in declaration order
    pub project_references: Vec<ProjectId>,
    pub properties: ProjectProperties,
}

impl ProjectNode {
    /// File name, e.g. `MyApp.csproj`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without the descriptor extension, e.g. `MyApp`.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn relative_path(&self) -> String {
        relative_display(&self.path, &self.root_path)
    }

    /// Containing directory relative to the root, with a trailing `/`.
    pub fn directory_relative_path(&self) -> String {
        directory_relative_display(&self.path, &self.root_path)
    }
}

/// The descriptors reachable from one root project.
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    nodes: Vec<ProjectNode>,
    root: ProjectId,
}

impl ProjectGraph {
    /// Loads `path` and, transitively, every descriptor it references.
    ///
    /// `root_path` confines every descriptor to the repository; pass an empty
    /// path to disable the check. A referenced descriptor that cannot be opened
    /// is dropped with a warning, but failing to open `path` itself is an error.
    pub fn resolve(path: &Path, root_path: &Path) -> Result<Self, ProjectError> {
        let root_path = if root_path.as_os_str().is_empty() {
            PathBuf::new()
        } else {
            absolute(root_path).map_err(|source| ProjectError::Io {
                path: root_path.to_path_buf(),
                source,
            })?
        };
        let path = absolute(path).map_err(|source| ProjectError::RootUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let graph = Resolver::new(root_path).run(path)?;
        info!(
            root = %graph.root().path.display(),
            projects = graph.len(),
            "Project graph resolved"
        );
        Ok(graph)
    }

    pub fn root_id(&self) -> ProjectId {
        self.root
    }

    pub fn root(&self) -> &ProjectNode {
        &self.nodes[self.root.0]
    }

    pub fn node(&self, id: ProjectId) -> &ProjectNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, path: &Path) -> Option<&ProjectNode> {
        self.nodes.iter().find(|n| n.path == path)
    }

    /// Direct references of `id`, in declaration order.
    pub fn references(&self, id: ProjectId) -> impl Iterator<Item = &ProjectNode> + '_ {
        self.nodes[id.0]
            .project_references
            .iter()
            .map(move |r| &self.nodes[r.0])
    }

    /// Transitive closure of the root project, root included.
    pub fn closure(&self) -> Vec<&ProjectNode> {
        self.closure_of(self.root)
    }

    /// Every project reachable from `id` (itself included), once each, sorted
    /// case-insensitively by path with a literal tiebreaker.
    pub fn closure_of(&self, id: ProjectId) -> Vec<&ProjectNode> {
        let mut seen: HashSet<&Path> = HashSet::new();
        let mut result = Vec::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            let node = &self.nodes[current.0];
            if !seen.insert(node.path.as_path()) {
                continue;
            }
            result.push(node);
            // reversed so that the first declared reference is visited first
            stack.extend(node.project_references.iter().rev().copied());
        }

        result.sort_by(|a, b| compare_paths(&a.path, &b.path));
        result
    }
}

enum Slot {
    InProgress,
    Resolved(ProjectId),
    Missing,
}

struct Frame {
    id: ProjectId,
    pending: vec::IntoIter<PathBuf>,
}

struct Resolver {
    root_path: PathBuf,
    nodes: Vec<ProjectNode>,
    slots: HashMap<PathBuf, Slot>,
    stack: Vec<Frame>,
}

impl Resolver {
    fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            nodes: Vec::new(),
            slots: HashMap::new(),
            stack: Vec::new(),
        }
    }

    fn run(mut self, path: PathBuf) -> Result<ProjectGraph, ProjectError> {
        let root = self.load(&path, true)?;

        loop {
            let (parent, next) = match self.stack.last_mut() {
                Some(frame) => (frame.id, frame.pending.next()),
                None => break,
            };

            let Some(child) = next else {
                self.stack.pop();
                let finished = self.nodes[parent.0].path.clone();
                self.slots.insert(finished, Slot::Resolved(parent));
                continue;
            };

            match self.slots.get(&child) {
                Some(Slot::InProgress) => return Err(self.cycle_error(child)),
                Some(Slot::Resolved(id)) => {
                    let id = *id;
                    self.nodes[parent.0].project_references.push(id);
                }
                Some(Slot::Missing) => {}
                None => match self.load(&child, false) {
                    Ok(id) => self.nodes[parent.0].project_references.push(id),
                    Err(e) if e.is_recoverable() => {
                        warn!(path = %child.display(), "Cannot open project file, skipped");
                        self.slots.insert(child, Slot::Missing);
                    }
                    Err(e) => return Err(e),
                },
            }
        }

        Ok(ProjectGraph {
            nodes: self.nodes,
            root,
        })
    }

    /// Reads and parses one descriptor, allocates its node and pushes its frame.
    fn load(&mut self, path: &Path, is_root: bool) -> Result<ProjectId, ProjectError> {
        if !self.root_path.as_os_str().is_empty() && !path.starts_with(&self.root_path) {
            return Err(ProjectError::PathEscape {
                path: path.to_path_buf(),
                root: self.root_path.clone(),
            });
        }

        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(source) if is_root => {
                return Err(ProjectError::RootUnreadable {
                    path: path.to_path_buf(),
                    source,
                })
            }
            Err(_) => return Err(ProjectError::MissingProject(path.to_path_buf())),
        };

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|source| ProjectError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let parsed = parse_descriptor(&content, path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let pending: Vec<PathBuf> = parsed
            .project_references
            .iter()
            .flat_map(|include| expand_include(base_dir, include))
            .collect();

        debug!(
            path = %path.display(),
            packages = parsed.package_references.len(),
            references = pending.len(),
            depth = self.stack.len(),
            "Loaded project file"
        );

        let id = ProjectId(self.nodes.len());
        self.nodes.push(ProjectNode {
            path: path.to_path_buf(),
            root_path: self.root_path.clone(),
            package_references: parsed.package_references,
            project_references: Vec::new(),
            properties: parsed.properties,
        });
        self.slots.insert(path.to_path_buf(), Slot::InProgress);
        self.stack.push(Frame {
            id,
            pending: pending.into_iter(),
        });

        Ok(id)
    }

    fn cycle_error(&self, path: PathBuf) -> ProjectError {
        let mut chain: Vec<PathBuf> = self
            .stack
            .iter()
            .map(|frame| self.nodes[frame.id.0].path.clone())
            .skip_while(|p| *p != path)
            .collect();
        chain.push(path.clone());
        ProjectError::CircularReference { path, chain }
    }
}
