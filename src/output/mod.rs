pub mod diff;
pub mod report;

pub use report::{InspectReport, OutputFormat};
