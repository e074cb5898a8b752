//! Project descriptor (.csproj/.fsproj/.vbproj) parser.
//!
//! Only the parts of an MSBuild document that matter for container builds are
//! read: `<PropertyGroup>` identity properties and the `<PackageReference>` /
//! `<ProjectReference>` items of every `<ItemGroup>` directly under `<Project>`.
//! Project reference includes are returned raw; turning them into paths is the
//! job of [`super::pattern`].

use super::error::ProjectError;
use roxmltree::{Document, Node};
use serde::Serialize;
use std::path::Path;

/// A NuGet package reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReference {
    pub include: String,
    /// Empty when neither a `Version` attribute nor a `<Version>` element is present
    pub version: String,
}

/// Identity properties read from `<PropertyGroup>` elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectProperties {
    pub target_framework: Option<String>,
    pub assembly_name: Option<String>,
    pub output_type: Option<String>,
}

impl ProjectProperties {
    /// `8.0` for `net8.0`, `net8.0-windows` or `netcoreapp8.0`.
    pub fn dotnet_version(&self) -> Option<String> {
        let framework = self.target_framework.as_deref()?;
        let version = framework
            .strip_prefix("netcoreapp")
            .or_else(|| framework.strip_prefix("net"))?;
        let version = version.split('-').next().unwrap_or(version);

        let mut parts = version.split('.');
        let major = parts.next()?;
        let minor = parts.next()?;
        if major.is_empty()
            || minor.is_empty()
            || !major.chars().all(|c| c.is_ascii_digit())
            || !minor.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        Some(format!("{}.{}", major, minor))
    }
}

/// Direct content of one descriptor file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDescriptor {
    pub package_references: Vec<PackageReference>,
    /// Raw `Include` values, in document order
    pub project_references: Vec<String>,
    pub properties: ProjectProperties,
}

/// Parses descriptor `content` read from `path`.
///
/// Malformed XML or a root element other than `<Project>` is an error; a valid
/// document without references yields empty lists.
pub fn parse_descriptor(content: &str, path: &Path) -> Result<ParsedDescriptor, ProjectError> {
    let doc = Document::parse(content).map_err(|source| ProjectError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let project = doc.root_element();
    if project.tag_name().name() != "Project" {
        return Err(ProjectError::UnexpectedRoot {
            path: path.to_path_buf(),
            found: project.tag_name().name().to_string(),
        });
    }

    let mut parsed = ParsedDescriptor::default();

    for group in child_elements(project, "PropertyGroup") {
        read_properties(group, &mut parsed.properties);
    }

    for group in child_elements(project, "ItemGroup") {
        for item in group.children().filter(|n| n.is_element()) {
            match item.tag_name().name() {
                "PackageReference" => {
                    let Some(include) = item.attribute("Include") else {
                        continue;
                    };
                    parsed.package_references.push(PackageReference {
                        include: include.to_string(),
                        version: package_version(item),
                    });
                }
                "ProjectReference" => {
                    if let Some(include) = item.attribute("Include") {
                        parsed.project_references.push(include.to_string());
                    }
                }
                _ => {}
            }
        }
    }

    Ok(parsed)
}

fn child_elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn element_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child_elements(node, name)
        .filter_map(|n| n.text())
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

// Attribute first, then nested element.
fn package_version(item: Node<'_, '_>) -> String {
    match item.attribute("Version") {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => element_text(item, "Version").unwrap_or_default(),
    }
}

fn read_properties(group: Node<'_, '_>, properties: &mut ProjectProperties) {
    if properties.target_framework.is_none() {
        properties.target_framework = element_text(group, "TargetFramework").or_else(|| {
            element_text(group, "TargetFrameworks").and_then(|all| {
                all.split(';')
                    .map(str::trim)
                    .find(|f| !f.is_empty())
                    .map(str::to_string)
            })
        });
    }
    if properties.assembly_name.is_none() {
        properties.assembly_name = element_text(group, "AssemblyName");
    }
    if properties.output_type.is_none() {
        properties.output_type = element_text(group, "OutputType");
    }
}
