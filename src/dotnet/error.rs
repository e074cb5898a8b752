use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while resolving a project reference graph.
///
/// Everything except [`ProjectError::MissingProject`] aborts the resolution.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Failed to parse project file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: roxmltree::Error,
    },
    #[error("Project file {path} has root element <{found}>, expected <Project>")]
    UnexpectedRoot { path: PathBuf, found: String },
    #[error("Circular project reference: {}", format_chain(.chain))]
    CircularReference { path: PathBuf, chain: Vec<PathBuf> },
    #[error("Project file {path} is outside repository root {root}")]
    PathEscape { path: PathBuf, root: PathBuf },
    #[error("Missing project file: {0}")]
    MissingProject(PathBuf),
    #[error("Cannot open project file {path}: {source}")]
    RootUnreadable { path: PathBuf, source: io::Error },
    #[error("Failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

impl ProjectError {
    /// Whether the resolver may drop the offending reference and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProjectError::MissingProject(_))
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
