//! `.dockerbuild` project configuration
//!
//! An optional YAML file placed next to the project (or at the repository root)
//! that tweaks the generated Dockerfile. Every field is optional:
//!
//! ```yaml
//! language: dotnet
//! dotnet:
//!   sdk-version: "8.0"
//!   application-entrypoint: Api.dll
//! base:
//!   image: mcr.microsoft.com/dotnet/aspnet:8.0-alpine
//!   packages: [icu-libs]
//! base-build:
//!   packages: [git]
//! final:
//!   run:
//!     - adduser -D app
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File name looked up in the project directory and the repository root
pub const CONFIG_FILE_NAME: &str = ".dockerbuild";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Unknown language '{language}'. Valid options: {}", .known.join(", "))]
    UnknownLanguage {
        language: String,
        known: Vec<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DockerBuildConfig {
    /// Generator name; detected from the project path when absent
    pub language: Option<String>,
    pub dotnet: DotnetConfig,
    /// Runtime stage
    pub base: ImageConfig,
    /// Build stage
    pub base_build: ImageConfig,
    #[serde(rename = "final")]
    pub final_stage: FinalConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DotnetConfig {
    pub sdk_version: Option<String>,
    pub application_entrypoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub image: Option<String>,
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalConfig {
    /// Commands emitted as `RUN` lines in the runtime stage
    pub run: Vec<String>,
}

impl DockerBuildConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content, path)?;
        debug!(path = %path.display(), language = ?config.language, "Loaded config file");
        Ok(config)
    }

    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        // an empty file deserializes to unit, not to a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `explicit` if given, else the first [`CONFIG_FILE_NAME`] found in
    /// `project_dir` and then `repo_root`, else defaults.
    pub fn discover(
        explicit: Option<&Path>,
        project_dir: &Path,
        repo_root: &Path,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        for dir in [project_dir, repo_root] {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Rejects a `language` that is not one of `known`.
    pub fn validate(&self, known: &[&str]) -> Result<(), ConfigError> {
        match &self.language {
            Some(language) if !known.iter().any(|k| k.eq_ignore_ascii_case(language)) => {
                Err(ConfigError::UnknownLanguage {
                    language: language.clone(),
                    known: known.iter().map(|k| k.to_string()).collect(),
                })
            }
            _ => Ok(()),
        }
    }
}
