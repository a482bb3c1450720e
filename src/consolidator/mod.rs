pub mod output_manager;
pub mod year_buckets;

pub use output_manager::{
    FailureReason, FileOutcome, FileReport, OutputManager, RunReport, RunSummary, SaveOutcome,
};
pub use year_buckets::{resolve_year, YearAssignment, YearBuckets};

use crate::config::{Config, SourceEntry};
use crate::error::{ConsolidateError, Result};
use crate::extractor::{SheetExtractor, Table};
use chrono::Utc;
use tracing::{error, info, warn};

/// Message logged when a run finishes without any failure.
pub const SUCCESS_MESSAGE: &str = "Processamento concluído com sucesso!";

/// Reads the configured region from every source file, buckets the tables
/// by year and writes the consolidated workbook.
pub struct Consolidator {
    config: Config,
    extractor: SheetExtractor,
    output: OutputManager,
    buckets: YearBuckets,
}

impl Consolidator {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let extractor = SheetExtractor::new(&config.extraction)?;
        let output = OutputManager::new(&config);
        let buckets = YearBuckets::new(&config.extraction.years);

        Ok(Self {
            config,
            extractor,
            output,
            buckets,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn buckets(&self) -> &YearBuckets {
        &self.buckets
    }

    pub fn output_manager(&self) -> &OutputManager {
        &self.output
    }

    /// Extracts one file, logging the failure if there is one.
    pub fn extract_file(&self, entry: &SourceEntry) -> Result<Table> {
        self.extractor.extract(entry).inspect_err(|e| {
            error!(
                "Error processing {} ({}): {}",
                entry.description,
                entry.path.display(),
                e
            );
        })
    }

    /// Processes every configured entry in order and fills the year
    /// buckets. Returns one report per entry.
    pub fn process_files(&mut self) -> Vec<FileReport> {
        let entries = self.config.files.clone();
        entries
            .iter()
            .map(|entry| FileReport::new(entry, self.process_entry(entry)))
            .collect()
    }

    fn process_entry(&mut self, entry: &SourceEntry) -> FileOutcome {
        if !entry.has_path() {
            return FileOutcome::Skipped;
        }

        if !entry.path.exists() {
            error!("File not found: {}", entry.path.display());
            return FileOutcome::Missing;
        }

        info!("Processing file: {}", entry.description);
        let table = match self.extract_file(entry) {
            Ok(table) => table,
            Err(e) => {
                return FileOutcome::Failed {
                    reason: FailureReason::from(&e),
                    message: e.to_string(),
                }
            }
        };

        let rows = table.len();
        let assignment = resolve_year(entry, self.buckets.years());
        self.buckets.add(assignment, entry, table);

        match assignment.year() {
            Some(year) => {
                info!("Data from {} added to year {}", entry.description, year);
                FileOutcome::Assigned { assignment, rows }
            }
            None => {
                warn!(
                    "No configured year matches {} ({}); its data will not be written",
                    entry.description,
                    entry.path.display()
                );
                FileOutcome::Unassigned { rows }
            }
        }
    }

    /// Writes the consolidated workbook. Never fails; the outcome says
    /// what happened.
    pub fn save_consolidated(&self) -> SaveOutcome {
        self.output.save_workbook(&self.buckets)
    }

    /// Runs the whole pipeline: output directory, files, workbook, report.
    ///
    /// Errors only when nothing is configured or the output directory
    /// cannot be created. Files that fail, are missing, or match no year
    /// are recorded in the summary and the run still completes.
    pub fn run(&mut self) -> Result<RunSummary> {
        info!("Starting PCAT file processing");

        if !self.config.files.iter().any(SourceEntry::has_path) {
            error!("No files configured for processing");
            return Err(ConsolidateError::NoSourcesConfigured);
        }

        self.output.initialize()?;
        let files = self.process_files();
        let save = self.save_consolidated();
        let summary = RunSummary::from_reports(&files, save);

        let report = RunReport {
            generated_at: Utc::now(),
            sheet_name: self.config.extraction.sheet_name.clone(),
            region: self.extractor.region().to_string(),
            output_file: self.output.get_output_file().to_path_buf(),
            files,
            summary: summary.clone(),
        };
        match self.output.write_report(&report) {
            Ok(Some(path)) => info!("Run report written to: {}", path.display()),
            Ok(None) => {}
            Err(e) => warn!("{}", e),
        }

        info!("{}", summary.display_summary());
        if !summary.is_clean() {
            warn!(
                "Processing finished with problems: {} failed, {} missing",
                summary.failed, summary.missing
            );
        }
        if summary.unassigned > 0 {
            warn!(
                "{} extracted file(s) matched no configured year and were left out of the workbook",
                summary.unassigned
            );
        }
        info!("{}", SUCCESS_MESSAGE);

        Ok(summary)
    }

    /// Describes what a run would do without reading any workbook.
    pub fn plan(&self) -> Vec<PlannedFile> {
        self.config
            .files
            .iter()
            .map(|entry| PlannedFile {
                entry: entry.clone(),
                exists: entry.has_path() && entry.path.exists(),
                assignment: resolve_year(entry, self.buckets.years()),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PlannedFile {
    pub entry: SourceEntry,
    pub exists: bool,
    pub assignment: YearAssignment,
}
