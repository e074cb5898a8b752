//! Subcommand handlers. Each returns the process exit code.

use super::commands::{GenerateArgs, InspectArgs};
use crate::config::DockerBuildConfig;
use crate::generator::{Generator, GeneratorRegistry, LoadedProject};
use crate::output::{diff, InspectReport};
use crate::repo::find_repository_root;
use crate::util::paths::absolute;
use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// A project loaded by the generator chosen for it.
struct Target<'a> {
    generator: &'a dyn Generator,
    path: PathBuf,
    project_dir: PathBuf,
    config: DockerBuildConfig,
    loaded: LoadedProject,
}

fn load_target<'a>(
    registry: &'a GeneratorRegistry,
    path: &Path,
    language: Option<&str>,
    config_path: Option<&Path>,
) -> Result<Target<'a>> {
    let path = absolute(path).with_context(|| format!("Invalid path {}", path.display()))?;
    if !path.exists() {
        bail!("Path not found: {}", path.display());
    }

    let repo_root = find_repository_root(&path)
        .ok_or_else(|| anyhow!("Cannot find repository root for {}", path.display()))?;
    let project_dir = if path.is_dir() {
        path.clone()
    } else {
        path.parent().map(Path::to_path_buf).unwrap_or_else(|| repo_root.clone())
    };

    let config = DockerBuildConfig::discover(config_path, &project_dir, &repo_root)?;
    config.validate(&registry.names())?;

    let generator = match language.or(config.language.as_deref()) {
        Some(name) => registry.get(name).ok_or_else(|| {
            anyhow!(
                "Unknown language '{}'. Valid options: {}",
                name,
                registry.names().join(", ")
            )
        })?,
        None => registry.detect(&path).ok_or_else(|| {
            anyhow!(
                "Could not detect the project language for {}; pass --language",
                path.display()
            )
        })?,
    };
    info!(generator = generator.name(), path = %path.display(), root = %repo_root.display(), "Loading project");

    let loaded = generator
        .load(&path, &repo_root)
        .with_context(|| format!("Failed to load project {}", path.display()))?;

    Ok(Target {
        generator,
        path,
        project_dir,
        config,
        loaded,
    })
}

fn run_generate(args: &GenerateArgs) -> Result<()> {
    let registry = GeneratorRegistry::with_defaults();
    let target = load_target(
        &registry,
        &args.path,
        args.language.as_deref(),
        args.config.as_deref(),
    )?;

    let content = target
        .generator
        .render(&target.loaded, &target.config)
        .context("Failed to render Dockerfile")?;
    let dest = target.project_dir.join(&args.dockerfile);

    if args.dry_run {
        let existing = match fs::read_to_string(&dest) {
            Ok(existing) => existing,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", dest.display()))
            }
        };
        debug!(dest = %dest.display(), "Dry run, not writing");
        print!("{}", diff::unified(&existing, &content, &args.dockerfile));
        return Ok(());
    }

    fs::write(&dest, &content).with_context(|| format!("Failed to write {}", dest.display()))?;
    println!(
        "Successfully generated {} for project {}",
        dest.display(),
        target.path.display()
    );
    Ok(())
}

fn run_inspect(args: &InspectArgs) -> Result<()> {
    let registry = GeneratorRegistry::with_defaults();
    let target = load_target(
        &registry,
        &args.path,
        args.language.as_deref(),
        args.config.as_deref(),
    )?;

    let report = InspectReport::new(target.generator.name(), &target.loaded);
    println!("{}", report.format(args.format.into())?.trim_end());
    Ok(())
}

pub fn handle_generate(args: &GenerateArgs) -> i32 {
    exit_code(run_generate(args))
}

pub fn handle_inspect(args: &InspectArgs) -> i32 {
    exit_code(run_inspect(args))
}

fn exit_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
