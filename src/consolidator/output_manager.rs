use crate::config::{Config, SourceEntry};
use crate::consolidator::year_buckets::{YearAssignment, YearBuckets};
use crate::error::{ConsolidateError, Result};
use crate::extractor::{CellValue, Table};
use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const REPORT_FILE_NAME: &str = "relatorio_execucao.json";

/// Why a file produced no table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    WorkbookOpen,
    SheetNotFound,
    SheetRead,
    DuplicateColumn,
    Other,
}

impl From<&ConsolidateError> for FailureReason {
    fn from(error: &ConsolidateError) -> Self {
        match error {
            ConsolidateError::WorkbookOpen { .. } => FailureReason::WorkbookOpen,
            ConsolidateError::SheetNotFound { .. } => FailureReason::SheetNotFound,
            ConsolidateError::SheetRead { .. } => FailureReason::SheetRead,
            ConsolidateError::DuplicateColumn { .. } => FailureReason::DuplicateColumn,
            _ => FailureReason::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum FileOutcome {
    /// Entry without a path.
    Skipped,
    /// Path does not exist; nothing was read.
    Missing,
    Failed { reason: FailureReason, message: String },
    Assigned { assignment: YearAssignment, rows: usize },
    /// Extracted, but matched no configured year.
    Unassigned { rows: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub description: String,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn new(entry: &SourceEntry, outcome: FileOutcome) -> Self {
        Self {
            path: entry.path.clone(),
            description: entry.description.clone(),
            outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SaveOutcome {
    Written { path: PathBuf, sheets: Vec<u16> },
    /// No year had data, so no workbook was created.
    NothingToWrite,
    Failed { message: String },
}

impl SaveOutcome {
    pub fn sheets(&self) -> &[u16] {
        match self {
            SaveOutcome::Written { sheets, .. } => sheets,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub missing: usize,
    pub skipped: usize,
    pub unassigned: usize,
    pub save: SaveOutcome,
}

impl RunSummary {
    pub fn from_reports(files: &[FileReport], save: SaveOutcome) -> Self {
        let count = |pred: fn(&FileOutcome) -> bool| files.iter().filter(|f| pred(&f.outcome)).count();

        Self {
            total: files.len(),
            succeeded: count(|o| matches!(o, FileOutcome::Assigned { .. })),
            failed: count(|o| matches!(o, FileOutcome::Failed { .. })),
            missing: count(|o| matches!(o, FileOutcome::Missing)),
            skipped: count(|o| matches!(o, FileOutcome::Skipped)),
            unassigned: count(|o| matches!(o, FileOutcome::Unassigned { .. })),
            save,
        }
    }

    /// True when every file with a path was read and the workbook was saved.
    /// Tables that matched no year are not a failure.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.missing == 0 && !matches!(self.save, SaveOutcome::Failed { .. })
    }

    pub fn display_summary(&self) -> String {
        format!(
            "{} files: {} consolidated, {} failed, {} missing, {} unassigned, {} skipped; {} sheets written",
            self.total,
            self.succeeded,
            self.failed,
            self.missing,
            self.unassigned,
            self.skipped,
            self.save.sheets().len()
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub sheet_name: String,
    pub region: String,
    pub output_file: PathBuf,
    pub files: Vec<FileReport>,
    pub summary: RunSummary,
}

pub struct OutputManager {
    output_directory: PathBuf,
    output_file: PathBuf,
    generate_report: bool,
}

impl OutputManager {
    pub fn new(config: &Config) -> Self {
        Self {
            output_directory: config.output_directory(),
            output_file: config.output_file(),
            generate_report: config.output.generate_report,
        }
    }

    pub fn get_output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn get_output_file(&self) -> &Path {
        &self.output_file
    }

    /// Creates the output directory if it is missing. Returns whether it
    /// had to be created.
    pub fn initialize(&self) -> Result<bool> {
        if self.output_directory.is_dir() {
            return Ok(false);
        }

        fs::create_dir_all(&self.output_directory)?;
        info!("Created output directory: {}", self.output_directory.display());
        Ok(true)
    }

    /// Writes one sheet per year with data. Failures are logged and
    /// reported through the outcome, never returned as errors.
    pub fn save_workbook(&self, buckets: &YearBuckets) -> SaveOutcome {
        if let Err(e) = self.initialize() {
            error!("Failed to save consolidated workbook: {}", e);
            return SaveOutcome::Failed {
                message: e.to_string(),
            };
        }

        match self.write_workbook(buckets) {
            Ok(sheets) if sheets.is_empty() => {
                warn!("No data for any configured year; consolidated workbook not written");
                SaveOutcome::NothingToWrite
            }
            Ok(sheets) => {
                info!("Consolidated workbook saved to: {}", self.output_file.display());
                SaveOutcome::Written {
                    path: self.output_file.clone(),
                    sheets,
                }
            }
            Err(e) => {
                error!("Failed to save consolidated workbook: {}", e);
                SaveOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    fn write_workbook(&self, buckets: &YearBuckets) -> Result<Vec<u16>> {
        let mut workbook = Workbook::new();
        let formats = SheetFormats::new();
        let mut sheets = Vec::new();

        for (year, table) in buckets.consolidated() {
            let Some(table) = table else {
                warn!("No data found for year {}", year);
                continue;
            };

            let worksheet = workbook.add_worksheet();
            worksheet.set_name(year.to_string())?;
            write_table(worksheet, &table, &formats)?;
            info!("Year {} saved: {} rows", year, table.len());
            sheets.push(year);
        }

        // An empty workbook would be saved with a default sheet.
        if !sheets.is_empty() {
            workbook.save(&self.output_file)?;
        }

        Ok(sheets)
    }

    /// Writes the JSON run report next to the workbook, when enabled.
    pub fn write_report(&self, report: &RunReport) -> Result<Option<PathBuf>> {
        if !self.generate_report {
            return Ok(None);
        }

        let report_path = self.output_directory.join(REPORT_FILE_NAME);
        let json_content = serde_json::to_string_pretty(report)?;
        fs::write(&report_path, json_content).map_err(|e| ConsolidateError::Report {
            message: format!("{}: {}", report_path.display(), e),
        })?;

        Ok(Some(report_path))
    }
}

struct SheetFormats {
    header: Format,
    date: Format,
}

impl SheetFormats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold().set_border(FormatBorder::Thin),
            date: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
        }
    }
}

fn write_table(worksheet: &mut Worksheet, table: &Table, formats: &SheetFormats) -> Result<()> {
    for (col, label) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, label, &formats.header)?;
    }

    for (i, row) in table.rows().iter().enumerate() {
        let row_num = i as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    worksheet.write_string(row_num, col, s)?;
                }
                CellValue::Int(v) => {
                    worksheet.write_number(row_num, col, *v as f64)?;
                }
                CellValue::Number(v) => {
                    worksheet.write_number(row_num, col, *v)?;
                }
                CellValue::Bool(v) => {
                    worksheet.write_boolean(row_num, col, *v)?;
                }
                CellValue::DateTime(v) => {
                    worksheet.write_number_with_format(row_num, col, *v, &formats.date)?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Reader, Xlsx};
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.output.base_directory = dir.to_path_buf();
        config.extraction.years = vec![2019, 2020];
        config.files.clear();
        config
    }

    fn table(desc: &str, value: f64) -> Table {
        let mut t = Table::new(vec!["Arquivo_Origem".to_string(), "Valor".to_string()]);
        t.push_row(vec![CellValue::from(desc), CellValue::Number(value)]);
        t
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let manager = OutputManager::new(&config_in(temp_dir.path()));

        assert!(manager.initialize().unwrap());
        assert!(manager.get_output_directory().is_dir());
        assert!(!manager.initialize().unwrap());
    }

    #[test]
    fn test_save_writes_only_years_with_data() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let manager = OutputManager::new(&config);

        let mut buckets = YearBuckets::new(&config.extraction.years);
        let entry = SourceEntry::new("/pcat/PCAT_2020.xlsx", "PCAT 2020");
        buckets.add(YearAssignment::Inferred(2020), &entry, table("a", 1.0));
        buckets.add(YearAssignment::Inferred(2020), &entry, table("b", 2.0));

        let outcome = manager.save_workbook(&buckets);
        assert_eq!(outcome.sheets(), &[2020]);

        let mut workbook: Xlsx<_> = open_workbook(manager.get_output_file()).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["2020".to_string()]);

        let range = workbook.worksheet_range("2020").unwrap();
        assert_eq!(range.get_size(), (3, 2));
        assert_eq!(range.get_value((0, 1)).unwrap().to_string(), "Valor");
        assert_eq!(range.get_value((2, 0)).unwrap().to_string(), "b");
    }

    #[test]
    fn test_nothing_to_write() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let manager = OutputManager::new(&config);

        let outcome = manager.save_workbook(&YearBuckets::new(&config.extraction.years));
        assert_eq!(outcome, SaveOutcome::NothingToWrite);
        assert!(!manager.get_output_file().exists());
    }

    #[test]
    fn test_save_failure_is_reported_not_raised() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let manager = OutputManager::new(&config);

        // A directory where the workbook should go makes the save fail.
        fs::create_dir_all(manager.get_output_file()).unwrap();

        let mut buckets = YearBuckets::new(&config.extraction.years);
        let entry = SourceEntry::new("/pcat/PCAT_2019.xlsx", "PCAT 2019");
        buckets.add(YearAssignment::Inferred(2019), &entry, table("a", 1.0));

        let outcome = manager.save_workbook(&buckets);
        assert!(matches!(outcome, SaveOutcome::Failed { .. }));
    }

    #[test]
    fn test_summary_counts() {
        let entry = SourceEntry::new("/pcat/x.xlsx", "x");
        let files = vec![
            FileReport::new(&entry, FileOutcome::Skipped),
            FileReport::new(&entry, FileOutcome::Missing),
            FileReport::new(
                &entry,
                FileOutcome::Assigned {
                    assignment: YearAssignment::Inferred(2020),
                    rows: 3,
                },
            ),
            FileReport::new(&entry, FileOutcome::Unassigned { rows: 1 }),
        ];

        let summary = RunSummary::from_reports(&files, SaveOutcome::NothingToWrite);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.unassigned, 1);
        assert_eq!(summary.failed, 0);
        assert!(!summary.is_clean());
        assert!(summary.display_summary().starts_with("4 files: 1 consolidated"));
    }

    #[test]
    fn test_unassigned_tables_do_not_taint_summary() {
        let entry = SourceEntry::new("/pcat/PCAT_2025.xlsx", "PCAT 2025");
        let files = vec![
            FileReport::new(&entry, FileOutcome::Unassigned { rows: 10 }),
            FileReport::new(
                &entry,
                FileOutcome::Assigned {
                    assignment: YearAssignment::Inferred(2020),
                    rows: 2,
                },
            ),
        ];

        let summary = RunSummary::from_reports(
            &files,
            SaveOutcome::Written {
                path: PathBuf::from("/out/PCAT_Efeito_Consolidado.xlsx"),
                sheets: vec![2020],
            },
        );
        assert_eq!(summary.unassigned, 1);
        assert!(summary.is_clean());
    }

    #[test]
    fn test_report_written_as_json() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let manager = OutputManager::new(&config);
        manager.initialize().unwrap();

        let report = RunReport {
            generated_at: Utc::now(),
            sheet_name: "EFEITO".to_string(),
            region: "AI1:AV12".to_string(),
            output_file: manager.get_output_file().to_path_buf(),
            files: vec![FileReport::new(
                &SourceEntry::new("/pcat/missing_2020.xlsx", "PCAT 2020"),
                FileOutcome::Missing,
            )],
            summary: RunSummary::from_reports(&[], SaveOutcome::NothingToWrite),
        };

        let path = manager.write_report(&report).unwrap().unwrap();
        let content = fs::read_to_string(path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["files"][0]["outcome"]["status"], "missing");
        assert_eq!(json["summary"]["save"]["status"], "nothing_to_write");
    }
}
