//! Language generators
//!
//! A generator recognises a project path, loads whatever it needs from the
//! repository and renders a Dockerfile from it. Generators are looked up by
//! name or by detection through a [`GeneratorRegistry`].

use crate::config::DockerBuildConfig;
use crate::dotnet::{ProjectError, ProjectGraph};
use crate::golang::GoProject;
use crate::util::paths::{directory_relative_display, relative_display};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod registry;

pub use registry::GeneratorRegistry;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("{path} is not supported by the {generator} generator: {reason}")]
    UnsupportedPath {
        generator: String,
        path: PathBuf,
        reason: String,
    },

    #[error("No project file found in {0}")]
    NoProjectFound(PathBuf),

    #[error("Multiple project files found in {dir}; specify one explicitly: {}", .candidates.join(", "))]
    MultipleProjects { dir: PathBuf, candidates: Vec<String> },

    #[error("The {generator} generator cannot render a {found} project")]
    ProjectMismatch { generator: String, found: String },

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid Dockerfile template: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Failed to render Dockerfile: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// An extra build-context file that must be copied before restoring packages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdditionalFilePath {
    pub path: PathBuf,
    pub root_path: PathBuf,
}

impl AdditionalFilePath {
    pub fn new(path: PathBuf, root_path: PathBuf) -> Self {
        Self { path, root_path }
    }

    pub fn relative_path(&self) -> String {
        relative_display(&self.path, &self.root_path)
    }

    /// Containing directory relative to the root, with a trailing `/`.
    pub fn directory_relative_path(&self) -> String {
        directory_relative_display(&self.path, &self.root_path)
    }
}

/// Language-specific project model produced by [`Generator::load`].
#[derive(Debug, Clone)]
pub enum ProjectData {
    Dotnet(ProjectGraph),
    Go(GoProject),
}

impl ProjectData {
    pub fn kind(&self) -> &'static str {
        match self {
            ProjectData::Dotnet(_) => "dotnet",
            ProjectData::Go(_) => "go",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub data: ProjectData,
    pub additional_files: Vec<AdditionalFilePath>,
}

pub trait Generator: Send + Sync {
    /// Registry key, also accepted as `language` in the config file
    fn name(&self) -> &str;

    /// Whether `path` (a file or a directory) looks like a project this
    /// generator can handle. Never fails; unreadable paths are not detected.
    fn detect(&self, path: &Path) -> bool;

    fn load(&self, project_path: &Path, repo_root: &Path) -> Result<LoadedProject, GeneratorError>;

    /// Dockerfile content for a project previously returned by [`Generator::load`].
    fn render(
        &self,
        project: &LoadedProject,
        config: &DockerBuildConfig,
    ) -> Result<String, GeneratorError>;
}

/// A copied file as seen from the build context root.
#[derive(Debug, Serialize)]
pub(crate) struct CopyEntry {
    pub path: String,
    pub directory: String,
}

/// Renders a Dockerfile template. Output is plain text, so values are not escaped.
pub(crate) fn render_template<T: Serialize>(
    name: &str,
    template: &str,
    context: &T,
) -> Result<String, GeneratorError> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.register_template_string(name, template)?;
    Ok(handlebars.render(name, context)?)
}
