pub mod commands;
pub mod handlers;

pub use commands::{normalize_legacy_args, CliArgs, Commands, GenerateArgs, InspectArgs, OutputFormatArg};
pub use handlers::{handle_generate, handle_inspect};
