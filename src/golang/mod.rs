//! Go module Dockerfile generator

use crate::config::DockerBuildConfig;
use crate::generator::{render_template, Generator, GeneratorError, LoadedProject, ProjectData};
use crate::util::paths::{absolute, directory_relative_display, relative_display};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const GO_MOD: &str = "go.mod";
pub const GO_SUM: &str = "go.sum";
pub const DEFAULT_GO_VERSION: &str = "1.23";
pub const DEFAULT_BUILD_IMAGE: &str = "golang:${GO_VERSION}-alpine";
pub const DEFAULT_RUNTIME_IMAGE: &str = "alpine:3.19";

/// A Go module rooted at the directory holding `go.mod`.
#[derive(Debug, Clone, Serialize)]
pub struct GoProject {
    pub root_path: PathBuf,
    /// Directory containing go.mod
    pub path: PathBuf,
    /// Last segment of the module path
    pub name: String,
    pub go_version: Option<String>,
    pub has_go_sum: bool,
}

impl GoProject {
    pub fn relative_path(&self) -> String {
        relative_display(&self.path.join(GO_MOD), &self.root_path)
    }

    /// Module directory relative to the root, with a trailing `/`.
    pub fn directory_relative_path(&self) -> String {
        directory_relative_display(&self.path.join(GO_MOD), &self.root_path)
    }
}

/// Module name and `go` directive of a go.mod file.
fn parse_go_mod(content: &str) -> (Option<String>, Option<String>) {
    let module = Regex::new(r"(?m)^\s*module\s+(\S+)")
        .ok()
        .and_then(|re| re.captures(content))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches('"'))
        .and_then(|m| m.rsplit('/').next())
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    let version = Regex::new(r"(?m)^\s*go\s+(\d+\.\d+(?:\.\d+)?)")
        .ok()
        .and_then(|re| re.captures(content))
        .and_then(|caps| caps.get(1))
        .map(|v| v.as_str().to_string());

    (module, version)
}

pub struct GoGenerator;

impl Generator for GoGenerator {
    fn name(&self) -> &str {
        "go"
    }

    fn detect(&self, path: &Path) -> bool {
        if path.is_dir() {
            return path.join(GO_MOD).is_file();
        }
        path.is_file() && path.file_name().is_some_and(|n| n == GO_MOD)
    }

    fn load(&self, project_path: &Path, repo_root: &Path) -> Result<LoadedProject, GeneratorError> {
        let io_err = |source| GeneratorError::Io {
            path: project_path.to_path_buf(),
            source,
        };
        let metadata = fs::metadata(project_path).map_err(io_err)?;

        let dir = if metadata.is_dir() {
            project_path.to_path_buf()
        } else if project_path.file_name().is_some_and(|n| n == GO_MOD) {
            project_path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            return Err(GeneratorError::UnsupportedPath {
                generator: self.name().to_string(),
                path: project_path.to_path_buf(),
                reason: "expected a directory containing go.mod or the go.mod file itself".to_string(),
            });
        };
        let dir = absolute(&dir).map_err(io_err)?;

        let mod_path = dir.join(GO_MOD);
        let content = fs::read_to_string(&mod_path).map_err(|source| GeneratorError::Io {
            path: mod_path.clone(),
            source,
        })?;
        debug!(path = %mod_path.display(), bytes = content.len(), "Reading go module file");

        let (module, go_version) = parse_go_mod(&content);
        let name = module.unwrap_or_else(|| {
            dir.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "app".to_string())
        });

        let root_path = if repo_root.as_os_str().is_empty() {
            dir.clone()
        } else {
            absolute(repo_root).map_err(io_err)?
        };

        let project = GoProject {
            has_go_sum: dir.join(GO_SUM).is_file(),
            root_path,
            path: dir,
            name,
            go_version,
        };
        debug!(module = %project.name, path = %project.path.display(), "Loaded go project");

        Ok(LoadedProject {
            data: ProjectData::Go(project),
            additional_files: Vec::new(),
        })
    }

    fn render(&self, project: &LoadedProject, config: &DockerBuildConfig) -> Result<String, GeneratorError> {
        let ProjectData::Go(module) = &project.data else {
            return Err(GeneratorError::ProjectMismatch {
                generator: self.name().to_string(),
                found: project.data.kind().to_string(),
            });
        };
        render_dockerfile(module, config)
    }
}

const DOCKERFILE_TEMPLATE: &str = r#"ARG GO_VERSION={{go_version}}

FROM {{build_image}} AS build
WORKDIR "{{workdir}}"
COPY ["{{go_mod}}", "./"]
{{#if go_sum}}COPY ["{{go_sum}}", "./"]
{{/if}}RUN go mod download
WORKDIR /src
COPY . .
WORKDIR "{{workdir}}"
RUN CGO_ENABLED=0 go build -trimpath -ldflags="-s -w" -o /out/{{binary}} .

FROM {{runtime_image}} AS final
{{#if runtime_packages}}RUN apk add --no-cache {{#each runtime_packages}}{{this}}{{#unless @last}} {{/unless}}{{/each}}
{{/if}}WORKDIR /app
COPY --from=build /out/{{binary}} /app/{{binary}}
{{#each run}}RUN {{this}}
{{/each}}ENTRYPOINT ["/app/{{binary}}"]
"#;

#[derive(Debug, Serialize)]
struct TemplateContext<'a> {
    go_version: &'a str,
    build_image: &'a str,
    runtime_image: &'a str,
    runtime_packages: &'a [String],
    workdir: String,
    go_mod: String,
    go_sum: Option<String>,
    binary: &'a str,
    run: &'a [String],
}

fn render_dockerfile(project: &GoProject, config: &DockerBuildConfig) -> Result<String, GeneratorError> {
    let build_image = config.base_build.image.as_deref().unwrap_or(DEFAULT_BUILD_IMAGE);
    let runtime_image = config.base.image.as_deref().unwrap_or(DEFAULT_RUNTIME_IMAGE);
    let go_version = project.go_version.as_deref().unwrap_or(DEFAULT_GO_VERSION);
    debug!(build = build_image, runtime = runtime_image, go_version, "Go image selection");

    let module_dir = project.directory_relative_path();
    let workdir = match module_dir.trim_end_matches('/') {
        "." | "" => "/src".to_string(),
        dir => format!("/src/{}", dir),
    };
    let copy_prefix = module_dir.trim_start_matches("./");

    let context = TemplateContext {
        go_version,
        build_image,
        runtime_image,
        runtime_packages: &config.base.packages,
        workdir,
        go_mod: format!("{}{}", copy_prefix, GO_MOD),
        go_sum: project
            .has_go_sum
            .then(|| format!("{}{}", copy_prefix, GO_SUM)),
        binary: &project.name,
        run: &config.final_stage.run,
    };

    render_template("go", DOCKERFILE_TEMPLATE, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageConfig;
    use tempfile::TempDir;

    fn module(dir: &Path, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(GO_MOD), content).unwrap();
    }

    fn load(path: &Path, root: &Path) -> GoProject {
        match GoGenerator.load(path, root).unwrap().data {
            ProjectData::Go(project) => project,
            other => panic!("Expected go project, got {}", other.kind()),
        }
    }

    #[test]
    fn test_parse_go_mod() {
        let (module, version) = parse_go_mod("module github.com/acme/svc\n\ngo 1.22.3\n");
        assert_eq!(module.as_deref(), Some("svc"));
        assert_eq!(version.as_deref(), Some("1.22.3"));

        let (module, version) = parse_go_mod("// empty\n");
        assert_eq!(module, None);
        assert_eq!(version, None);
    }

    #[test]
    fn test_detect_file_and_dir() {
        let dir = TempDir::new().unwrap();
        module(dir.path(), "module m\n\ngo 1.23");
        assert!(GoGenerator.detect(dir.path()));
        assert!(GoGenerator.detect(&dir.path().join(GO_MOD)));

        let other = TempDir::new().unwrap();
        assert!(!GoGenerator.detect(other.path()));
    }

    #[test]
    fn test_load_from_go_mod_file() {
        let dir = TempDir::new().unwrap();
        module(&dir.path().join("svc"), "module example.com/app\n\ngo 1.24\n");

        let project = load(&dir.path().join("svc/go.mod"), dir.path());
        assert_eq!(project.name, "app");
        assert_eq!(project.go_version.as_deref(), Some("1.24"));
        assert!(!project.has_go_sum);
        assert_eq!(project.directory_relative_path(), "svc/");
    }

    #[test]
    fn test_name_falls_back_to_directory() {
        let dir = TempDir::new().unwrap();
        module(&dir.path().join("worker"), "go 1.23\n");
        assert_eq!(load(&dir.path().join("worker"), dir.path()).name, "worker");
    }

    #[test]
    fn test_load_rejects_other_files() {
        let dir = TempDir::new().unwrap();
        let main = dir.path().join("main.go");
        fs::write(&main, "package main").unwrap();
        let result = GoGenerator.load(&main, dir.path());
        assert!(matches!(result, Err(GeneratorError::UnsupportedPath { .. })));
    }

    #[test]
    fn test_render_defaults() {
        let dir = TempDir::new().unwrap();
        module(dir.path(), "module example.com/app\n");
        fs::write(dir.path().join(GO_SUM), "").unwrap();

        let loaded = GoGenerator.load(dir.path(), dir.path()).unwrap();
        let content = GoGenerator.render(&loaded, &DockerBuildConfig::default()).unwrap();
        assert!(content.starts_with("ARG GO_VERSION=1.23\n"));
        assert!(content.contains("FROM golang:${GO_VERSION}-alpine AS build"));
        assert!(content.contains("FROM alpine:3.19 AS final"));
        assert!(content.contains(r#"COPY ["go.sum", "./"]"#));
        assert!(content.contains(r#"ENTRYPOINT ["/app/app"]"#));
    }

    #[test]
    fn test_render_overrides_install_runtime_packages_only() {
        let dir = TempDir::new().unwrap();
        module(dir.path(), "module example.com/app\n\ngo 1.23");

        let config = DockerBuildConfig {
            base: ImageConfig {
                image: Some("alpine:3.20".to_string()),
                packages: vec!["ca-certificates".to_string()],
            },
            base_build: ImageConfig {
                image: Some("golang:1.24-alpine".to_string()),
                packages: vec!["build-base".to_string()],
            },
            ..Default::default()
        };
        let loaded = GoGenerator.load(dir.path(), dir.path()).unwrap();
        let content = GoGenerator.render(&loaded, &config).unwrap();
        assert!(content.contains("FROM golang:1.24-alpine AS build"));
        assert!(content.contains("FROM alpine:3.20 AS final"));
        assert!(content.contains("RUN apk add --no-cache ca-certificates"));
        assert!(!content.contains("build-base"));
        assert!(!content.contains("go.sum"));
    }

    #[test]
    fn test_render_nested_module_full_output() {
        let dir = TempDir::new().unwrap();
        module(&dir.path().join("svc"), "module example.com/svc\n\ngo 1.22\n");
        fs::write(dir.path().join("svc").join(GO_SUM), "").unwrap();

        let config = DockerBuildConfig {
            final_stage: crate::config::FinalConfig {
                run: vec!["adduser -D app".to_string()],
            },
            ..Default::default()
        };
        let loaded = GoGenerator.load(&dir.path().join("svc"), dir.path()).unwrap();
        let content = GoGenerator.render(&loaded, &config).unwrap();
        assert_eq!(
            content,
            r#"ARG GO_VERSION=1.22

FROM golang:${GO_VERSION}-alpine AS build
WORKDIR "/src/svc"
COPY ["svc/go.mod", "./"]
COPY ["svc/go.sum", "./"]
RUN go mod download
WORKDIR /src
COPY . .
WORKDIR "/src/svc"
RUN CGO_ENABLED=0 go build -trimpath -ldflags="-s -w" -o /out/svc .

FROM alpine:3.19 AS final
WORKDIR /app
COPY --from=build /out/svc /app/svc
RUN adduser -D app
ENTRYPOINT ["/app/svc"]
"#
        );
    }
}
