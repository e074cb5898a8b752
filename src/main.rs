use dockerfile_generator::cli::commands::{normalize_legacy_args, CliArgs, Commands};
use dockerfile_generator::cli::handlers::{handle_generate, handle_inspect};
use dockerfile_generator::util::{init_logging, LoggingConfig};
use dockerfile_generator::VERSION;

use clap::Parser;
use std::env;
use tracing::debug;

fn main() {
    let args = CliArgs::parse_from(normalize_legacy_args(env::args()));
    init_logging(LoggingConfig::from_cli(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("dockerfile-generator v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Generate(generate_args) => handle_generate(generate_args),
        Commands::Inspect(inspect_args) => handle_inspect(inspect_args),
    };

    std::process::exit(exit_code);
}
