//! .NET project support: descriptor parsing, reference graph resolution,
//! build context discovery and Dockerfile rendering.

pub mod context;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod graph;
pub mod pattern;

pub use context::{locate_context_files, DirectoryKey, SearchCache};
pub use descriptor::{parse_descriptor, PackageReference, ParsedDescriptor, ProjectProperties};
pub use error::ProjectError;
pub use generator::DotnetGenerator;
pub use graph::{ProjectGraph, ProjectId, ProjectNode};
pub use pattern::{expand_include, is_descriptor_file};
