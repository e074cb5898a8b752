//! .NET Dockerfile generator

use super::context::locate_context_files;
use super::graph::ProjectGraph;
use super::pattern::is_descriptor_file;
use crate::config::DockerBuildConfig;
use crate::generator::{render_template, CopyEntry, Generator, GeneratorError, LoadedProject, ProjectData};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_RUNTIME_IMAGE: &str = "mcr.microsoft.com/dotnet/aspnet:${TARGET_DOTNET_VERSION}-alpine";
pub const DEFAULT_SDK_IMAGE: &str = "mcr.microsoft.com/dotnet/sdk:${TARGET_DOTNET_VERSION}-alpine";
pub const DEFAULT_DOTNET_VERSION: &str = "9.0";

pub struct DotnetGenerator;

impl DotnetGenerator {
    /// The single descriptor directly inside `dir`.
    fn single_descriptor(dir: &Path) -> Result<PathBuf, GeneratorError> {
        let mut candidates = descriptors_in(dir).map_err(|source| GeneratorError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        match candidates.len() {
            0 => Err(GeneratorError::NoProjectFound(dir.to_path_buf())),
            1 => Ok(candidates.remove(0)),
            _ => Err(GeneratorError::MultipleProjects {
                dir: dir.to_path_buf(),
                candidates: candidates
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect(),
            }),
        }
    }
}

fn descriptors_in(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .filter(|e| e.file_name().to_str().is_some_and(is_descriptor_file))
        .map(|e| e.path())
        .collect();
    found.sort();
    Ok(found)
}

impl Generator for DotnetGenerator {
    fn name(&self) -> &str {
        "dotnet"
    }

    fn detect(&self, path: &Path) -> bool {
        if path.is_dir() {
            return descriptors_in(path).map(|d| d.len() == 1).unwrap_or(false);
        }
        path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_descriptor_file)
    }

    fn load(&self, project_path: &Path, repo_root: &Path) -> Result<LoadedProject, GeneratorError> {
        let metadata = fs::metadata(project_path).map_err(|source| GeneratorError::Io {
            path: project_path.to_path_buf(),
            source,
        })?;

        let descriptor = if metadata.is_dir() {
            let found = Self::single_descriptor(project_path)?;
            debug!(dir = %project_path.display(), file = %found.display(), "Resolved single project file in directory");
            found
        } else {
            project_path.to_path_buf()
        };

        let is_descriptor = descriptor
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_descriptor_file);
        if !is_descriptor {
            return Err(GeneratorError::UnsupportedPath {
                generator: self.name().to_string(),
                path: descriptor,
                reason: "expected a .csproj, .fsproj or .vbproj file".to_string(),
            });
        }

        let graph = ProjectGraph::resolve(&descriptor, repo_root)?;
        let root = graph.root().root_path.clone();
        let additional_files = locate_context_files(&graph, &root);
        debug!(
            root = %graph.root().path.display(),
            projects = graph.closure().len(),
            additional_files = additional_files.len(),
            "Loaded dotnet project"
        );

        Ok(LoadedProject {
            data: ProjectData::Dotnet(graph),
            additional_files,
        })
    }

    fn render(&self, project: &LoadedProject, config: &DockerBuildConfig) -> Result<String, GeneratorError> {
        let ProjectData::Dotnet(graph) = &project.data else {
            return Err(GeneratorError::ProjectMismatch {
                generator: self.name().to_string(),
                found: project.data.kind().to_string(),
            });
        };
        render_dockerfile(graph, project, config)
    }
}

const DOCKERFILE_TEMPLATE: &str = r#"ARG TARGET_DOTNET_VERSION={{sdk_version}}

FROM {{runtime_image}} AS base
{{#if base_packages}}RUN apk add --no-cache {{#each base_packages}}{{this}}{{#unless @last}} {{/unless}}{{/each}}
{{/if}}WORKDIR /app

FROM {{sdk_image}} AS build
{{#if build_packages}}RUN apk add --no-cache {{#each build_packages}}{{this}}{{#unless @last}} {{/unless}}{{/each}}
{{/if}}WORKDIR /src
{{#each additional_files}}COPY ["{{path}}", "{{directory}}"]
{{/each}}{{#each projects}}COPY ["{{path}}", "{{directory}}"]
{{/each}}RUN dotnet restore "{{project_path}}"
COPY . .
WORKDIR "{{workdir}}"
RUN dotnet --no-restore publish "{{project_file}}" -c Release -o /app/publish /p:UseAppHost=false

FROM base AS final
WORKDIR /app
COPY --from=build /app/publish .
{{#each run}}RUN {{this}}
{{/each}}ENTRYPOINT ["dotnet", "{{entrypoint}}"]
"#;

#[derive(Debug, Serialize)]
struct TemplateContext<'a> {
    sdk_version: String,
    runtime_image: &'a str,
    sdk_image: &'a str,
    base_packages: &'a [String],
    build_packages: &'a [String],
    additional_files: Vec<CopyEntry>,
    /// Closure of the root project
    projects: Vec<CopyEntry>,
    project_path: String,
    project_file: String,
    workdir: String,
    run: &'a [String],
    entrypoint: String,
}

fn render_dockerfile(
    graph: &ProjectGraph,
    project: &LoadedProject,
    config: &DockerBuildConfig,
) -> Result<String, GeneratorError> {
    let root = graph.root();

    let runtime_image = config.base.image.as_deref().unwrap_or(DEFAULT_RUNTIME_IMAGE);
    let sdk_image = config.base_build.image.as_deref().unwrap_or(DEFAULT_SDK_IMAGE);
    let sdk_version = config
        .dotnet
        .sdk_version
        .clone()
        .or_else(|| root.properties.dotnet_version())
        .unwrap_or_else(|| DEFAULT_DOTNET_VERSION.to_string());
    let entrypoint = config
        .dotnet
        .application_entrypoint
        .clone()
        .or_else(|| root.properties.assembly_name.as_ref().map(|a| format!("{}.dll", a)))
        .unwrap_or_else(|| format!("{}.dll", root.name()));

    debug!(
        runtime = runtime_image,
        sdk = sdk_image,
        sdk_version = %sdk_version,
        entrypoint = %entrypoint,
        additional_files = project.additional_files.len(),
        "Dotnet image selection"
    );

    let project_dir = root.directory_relative_path();
    let workdir = match project_dir.trim_end_matches('/') {
        "." | "" => "/src".to_string(),
        dir => format!("/src/{}", dir),
    };

    let context = TemplateContext {
        sdk_version,
        runtime_image,
        sdk_image,
        base_packages: &config.base.packages,
        build_packages: &config.base_build.packages,
        additional_files: project
            .additional_files
            .iter()
            .map(|file| CopyEntry {
                path: file.relative_path(),
                directory: file.directory_relative_path(),
            })
            .collect(),
        projects: graph
            .closure()
            .into_iter()
            .map(|member| CopyEntry {
                path: member.relative_path(),
                directory: member.directory_relative_path(),
            })
            .collect(),
        project_path: root.relative_path(),
        project_file: root.file_name(),
        workdir,
        run: &config.final_stage.run,
        entrypoint,
    };

    render_template("dotnet", DOCKERFILE_TEMPLATE, &context)
}
