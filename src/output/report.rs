//! `inspect` report: what a generator would build from, in JSON, YAML or text.

use crate::dotnet::{PackageReference, ProjectGraph};
use crate::generator::{LoadedProject, ProjectData};
use crate::golang::GoProject;
use anyhow::{Context, Result};
use serde::Serialize;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub language: String,
    pub repository_root: String,
    /// Root project file, relative to the repository root
    pub project: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<ProjectEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_module: Option<GoModuleEntry>,
}

/// One member of a .NET closure
#[derive(Debug, Clone, Serialize)]
pub struct ProjectEntry {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_framework: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembly_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,
    pub references: Vec<String>,
    pub packages: Vec<PackageReference>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoModuleEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_version: Option<String>,
}

impl InspectReport {
    pub fn new(language: &str, project: &LoadedProject) -> Self {
        let mut report = match &project.data {
            ProjectData::Dotnet(graph) => Self::from_graph(graph),
            ProjectData::Go(module) => Self::from_go(module),
        };
        report.language = language.to_string();
        report.context_files = project
            .additional_files
            .iter()
            .map(|f| f.relative_path())
            .collect();
        report
    }

    fn from_graph(graph: &ProjectGraph) -> Self {
        let projects = graph
            .closure()
            .into_iter()
            .map(|node| ProjectEntry {
                path: node.relative_path(),
                target_framework: node.properties.target_framework.clone(),
                assembly_name: node.properties.assembly_name.clone(),
                output_type: node.properties.output_type.clone(),
                references: node
                    .project_references
                    .iter()
                    .map(|r| graph.node(*r).relative_path())
                    .collect(),
                packages: node.package_references.clone(),
            })
            .collect();

        let root = graph.root();
        Self {
            language: String::new(),
            repository_root: root.root_path.display().to_string(),
            project: root.relative_path(),
            projects,
            context_files: Vec::new(),
            go_module: None,
        }
    }

    fn from_go(module: &GoProject) -> Self {
        Self {
            language: String::new(),
            repository_root: module.root_path.display().to_string(),
            project: module.relative_path(),
            projects: Vec::new(),
            context_files: Vec::new(),
            go_module: Some(GoModuleEntry {
                name: module.name.clone(),
                go_version: module.go_version.clone(),
            }),
        }
    }

    pub fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(self).context("Failed to serialize report to YAML")
            }
            OutputFormat::Human => Ok(self.format_human()),
        }
    }

    fn format_human(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Language:        {}\n", self.language));
        output.push_str(&format!("Repository root: {}\n", self.repository_root));
        output.push_str(&format!("Project:         {}\n", self.project));

        if let Some(module) = &self.go_module {
            output.push_str(&format!("Module:          {}\n", module.name));
            output.push_str(&format!(
                "Go version:      {}\n",
                module.go_version.as_deref().unwrap_or("(not specified)")
            ));
        }

        if !self.projects.is_empty() {
            output.push_str(&format!("\nProjects ({}):\n", self.projects.len()));
            for project in &self.projects {
                output.push_str(&format!("  {}", project.path));
                if let Some(framework) = &project.target_framework {
                    output.push_str(&format!(" [{}]", framework));
                }
                output.push('\n');
                for reference in &project.references {
                    output.push_str(&format!("    -> {}\n", reference));
                }
                for package in &project.packages {
                    if package.version.is_empty() {
                        output.push_str(&format!("    {}\n", package.include));
                    } else {
                        output.push_str(&format!("    {} {}\n", package.include, package.version));
                    }
                }
            }
        }

        output.push_str("\nContext files:\n");
        if self.context_files.is_empty() {
            output.push_str("  (none)\n");
        }
        for file in &self.context_files {
            output.push_str(&format!("  {}\n", file));
        }

        output
    }
}
