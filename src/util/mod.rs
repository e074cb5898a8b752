//! Utility modules
//!
//! - Structured logging setup and configuration
//! - Lexical path helpers shared by the project resolvers

pub mod logging;
pub mod paths;

pub use logging::{init_logging, parse_level, LoggingConfig};
