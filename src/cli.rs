use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pcat-efeito")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Consolidate the EFEITO region of yearly PCAT workbooks")]
#[command(
    long_about = "Reads a fixed cell region from the EFEITO worksheet of every PCAT workbook \
                  listed in the configuration, tags each block with its source file and writes \
                  one consolidated workbook with a sheet per year."
)]
#[command(after_help = "EXAMPLES:\n  \
    pcat-efeito\n  \
    pcat-efeito --config pcat-efeito.toml --verbose\n  \
    pcat-efeito --output-dir /data/relatorios --sheet EFEITO\n  \
    pcat-efeito --generate-config --config pcat-efeito.toml")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Directory in which the results folder is created
    #[arg(short, long, help = "Base directory for the output (defaults to the working directory)")]
    pub output_dir: Option<PathBuf>,

    /// Worksheet to read from every workbook
    #[arg(short, long)]
    pub sheet: Option<String>,

    /// Log file to append to
    #[arg(long, env = "PCAT_EFEITO_LOG")]
    pub log_file: Option<PathBuf>,

    /// Skip the JSON run report
    #[arg(long)]
    pub no_report: bool,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "List the files and years that would be processed without reading them")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_output_dir(self.output_dir.clone())
            .with_sheet_name(self.sheet.clone())
            .with_log_file(self.log_file.clone())
            .with_no_report(self.no_report)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
