pub mod cli;
pub mod config;
pub mod consolidator;
pub mod error;
pub mod extractor;
pub mod logging;

// Public API re-exports
pub use cli::Cli;
pub use config::{CliOverrides, Config, ExtractionConfig, LoggingConfig, OutputConfig, SourceEntry};
pub use error::{ConsolidateError, Result, UserFriendlyError};

// Core functionality re-exports
pub use consolidator::{
    Consolidator, FailureReason, FileOutcome, FileReport, OutputManager, PlannedFile, RunReport,
    RunSummary, SaveOutcome, YearAssignment, YearBuckets, SUCCESS_MESSAGE,
};
pub use extractor::{CellValue, Region, SheetExtractor, Table};

use std::path::Path;

/// Consolidates with the configuration found at `config_path` (or the
/// default lookup), without installing a logger.
pub fn consolidate<P: AsRef<Path>>(config_path: Option<P>) -> Result<RunSummary> {
    let config = Config::load_with_defaults(config_path)?;
    Consolidator::new(config)?.run()
}

/// Generate sample configuration file
pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let sample_config = Config::create_sample_config();
    std::fs::write(output_path.as_ref(), sample_config)?;
    Ok(())
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
