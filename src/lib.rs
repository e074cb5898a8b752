//! dockerfile-generator - multi-stage Dockerfiles for .NET and Go projects
//!
//! The interesting part is .NET: a project file only builds if every project it
//! references (transitively) and the build context files `dotnet restore` reads
//! (`nuget.config`, `Directory.Build.props`, `Directory.Packages.props`) are
//! copied into the build stage first. This crate resolves that set from the
//! repository and renders a Dockerfile that copies exactly it before restoring.
//!
//! # Example Usage
//!
//! ```no_run
//! use dockerfile_generator::config::DockerBuildConfig;
//! use dockerfile_generator::generator::{Generator, GeneratorRegistry};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let registry = GeneratorRegistry::with_defaults();
//! let path = Path::new("src/Api/Api.csproj");
//! if let Some(generator) = registry.detect(path) {
//!     let project = generator.load(path, Path::new("."))?;
//!     let dockerfile = generator.render(&project, &DockerBuildConfig::default())?;
//!     println!("{}", dockerfile);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`dotnet`]: descriptor parsing, reference graph, context files
//! - [`golang`]: Go module support
//! - [`generator`]: the [`generator::Generator`] trait and registry
//! - [`config`]: `.dockerbuild` configuration
//! - [`cli`]: command line interface

pub mod cli;
pub mod config;
pub mod dotnet;
pub mod generator;
pub mod golang;
pub mod output;
pub mod repo;
pub mod util;

pub use config::{ConfigError, DockerBuildConfig};
pub use dotnet::{ProjectError, ProjectGraph, ProjectNode};
pub use generator::{AdditionalFilePath, Generator, GeneratorError, GeneratorRegistry, LoadedProject, ProjectData};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "dockerfile-generator");
    }
}
