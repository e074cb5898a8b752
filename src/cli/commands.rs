use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Dockerfile generator for .NET and Go projects
#[derive(Parser, Debug)]
#[command(
    name = "dockerfile-generator",
    about = "Generate multi-stage Dockerfiles for .NET and Go projects",
    version,
    author,
    long_about = "dockerfile-generator resolves a project's reference graph inside its git \
                  repository, collects the build context files restore needs, and renders a \
                  cache-friendly multi-stage Dockerfile next to the project."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate a Dockerfile for a project",
        long_about = "Loads the project at --path, resolves its references and context files, \
                      and writes the Dockerfile into the project directory.\n\n\
                      Examples:\n  \
                      dockerfile-generator generate --path src/Api/Api.csproj\n  \
                      dockerfile-generator generate --path services/worker --language go\n  \
                      dockerfile-generator generate --path src/Api --dry-run"
    )]
    Generate(GenerateArgs),

    #[command(
        about = "Show the resolved project graph and context files",
        long_about = "Prints what generate would build from, without writing anything.\n\n\
                      Examples:\n  \
                      dockerfile-generator inspect --path src/Api\n  \
                      dockerfile-generator inspect --path src/Api --format json"
    )]
    Inspect(InspectArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(
        short = 'p',
        long,
        value_name = "PATH",
        default_value = ".",
        help = "Project file or directory"
    )]
    pub path: PathBuf,

    #[arg(
        short = 'l',
        long,
        value_name = "LANGUAGE",
        help = "Generator to use (dotnet, go); detected when omitted"
    )]
    pub language: Option<String>,

    #[arg(
        long,
        value_name = "NAME",
        default_value = "Dockerfile",
        help = "File name written in the project directory"
    )]
    pub dockerfile: String,

    #[arg(short = 'c', long, value_name = "FILE", help = "Config file (default: .dockerbuild)")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true",
        help = "Print a diff against the existing file instead of writing it"
    )]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    #[arg(
        short = 'p',
        long,
        value_name = "PATH",
        default_value = ".",
        help = "Project file or directory"
    )]
    pub path: PathBuf,

    #[arg(short = 'l', long, value_name = "LANGUAGE", help = "Generator to use (dotnet, go)")]
    pub language: Option<String>,

    #[arg(short = 'c', long, value_name = "FILE", help = "Config file (default: .dockerbuild)")]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for crate::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => crate::output::OutputFormat::Json,
            OutputFormatArg::Yaml => crate::output::OutputFormat::Yaml,
            OutputFormatArg::Human => crate::output::OutputFormat::Human,
        }
    }
}

/// Rewrites Go-style single-dash long flags (`-path x`, `-dry-run=true`) to
/// their `--` form. Short flags such as `-v` and everything after `--` are kept.
pub fn normalize_legacy_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut passthrough = false;
    args.into_iter()
        .enumerate()
        .map(|(idx, arg)| {
            if idx == 0 || passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }
            match arg.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') && is_long_name(rest) => format!("-{}", arg),
                _ => arg,
            }
        })
        .collect()
}

fn is_long_name(flag: &str) -> bool {
    let name = flag.split('=').next().unwrap_or(flag);
    name.len() > 1
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
