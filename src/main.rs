use anyhow::Context;
use clap::Parser;
use pcat_efeito::{
    logging, Cli, Config, ConsolidateError, Consolidator, LoggingConfig, RunSummary,
    UserFriendlyError, YearAssignment,
};
use std::process;
use tracing::error;

fn main() {
    let cli = Cli::parse();

    if cli.generate_config {
        process::exit(handle_generate_config(&cli));
    }

    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            log_startup_error(cli, &e);
            print_startup_error(&e);
            return 1;
        }
    };

    if let Err(e) = logging::init(&config.logging.log_file, cli.verbosity_level(), cli.quiet) {
        print_startup_error(&e);
        return 1;
    }

    if cli.dry_run {
        return handle_dry_run(config);
    }

    // Per-file and save problems are reported in the log, not the exit code
    match execute(config) {
        Ok(_) => 0,
        Err(e)
            if matches!(
                e.downcast_ref::<ConsolidateError>(),
                Some(ConsolidateError::NoSourcesConfigured)
            ) =>
        {
            0
        }
        Err(e) => {
            error!("Fatal error while running: {:#}", e);
            1
        }
    }
}

/// Records a configuration failure in the log file the run would have used.
/// The configured log file is unknown at this point, so the `--log-file`
/// override or the default name is used.
fn log_startup_error(cli: &Cli, error: &ConsolidateError) {
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| LoggingConfig::default().log_file);

    if logging::init(&log_file, cli.verbosity_level(), true).is_ok() {
        error!("Fatal error while loading configuration: {}", error.user_message());
    }
}

fn execute(config: Config) -> anyhow::Result<RunSummary> {
    let mut consolidator = Consolidator::new(config).context("invalid configuration")?;
    let summary = consolidator.run().context("consolidation aborted")?;
    Ok(summary)
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "pcat-efeito.toml".to_string());

    match pcat_efeito::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  pcat-efeito --config {}", config_path);
            println!("\nEdit the [[files]] entries to point at your PCAT workbooks.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(config: Config) -> i32 {
    let consolidator = match Consolidator::new(config) {
        Ok(consolidator) => consolidator,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    let config = consolidator.config();
    println!("DRY RUN MODE - No workbook will be read or written");
    println!(
        "  Sheet: {}  Region: {}{}:{}{}",
        config.extraction.sheet_name,
        config.extraction.start_col,
        config.extraction.start_row,
        config.extraction.end_col,
        config.extraction.end_row
    );
    println!(
        "  Years: {}",
        config
            .extraction
            .years
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Output: {}", config.output_file().display());
    println!();

    for planned in consolidator.plan() {
        let status = if !planned.entry.has_path() {
            "skip"
        } else if planned.exists {
            "ok"
        } else {
            "missing"
        };
        let year = match planned.assignment {
            YearAssignment::Tagged(year) => format!("{} (tagged)", year),
            YearAssignment::Inferred(year) => year.to_string(),
            YearAssignment::Unassigned => "unassigned".to_string(),
        };
        println!(
            "  [{:<7}] {:<12} {} ({})",
            status,
            year,
            planned.entry.description,
            planned.entry.path.display()
        );
    }

    0
}

fn print_startup_error(error: &ConsolidateError) {
    eprintln!("Error: {}", error.user_message());
    if let Some(suggestion) = error.suggestion() {
        eprintln!("Suggestion: {}", suggestion);
    }
}
