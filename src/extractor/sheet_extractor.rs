use crate::config::{ExtractionConfig, SourceEntry};
use crate::error::{ConsolidateError, Result};
use crate::extractor::region::Region;
use crate::extractor::table::{CellValue, Table};
use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::debug;

/// Label of the column holding the entry description.
pub const SOURCE_DESCRIPTION_COLUMN: &str = "Arquivo_Origem";
/// Label of the column holding the source path.
pub const SOURCE_PATH_COLUMN: &str = "Caminho_Arquivo";

/// Reads one fixed region from a named worksheet.
pub struct SheetExtractor {
    sheet_name: String,
    region: Region,
}

impl SheetExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            sheet_name: config.sheet_name.clone(),
            region: Region::from_config(config)?,
        })
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Reads the region from `entry` and prepends the two identifier
    /// columns. The workbook is closed before returning.
    pub fn extract(&self, entry: &SourceEntry) -> Result<Table> {
        let path = entry.path.to_string_lossy().to_string();

        let mut workbook =
            open_workbook_auto(&entry.path).map_err(|source| ConsolidateError::WorkbookOpen {
                path: path.clone(),
                source,
            })?;

        if !workbook.sheet_names().iter().any(|name| name == &self.sheet_name) {
            return Err(ConsolidateError::SheetNotFound {
                sheet: self.sheet_name.clone(),
                path,
            });
        }

        let range = workbook
            .worksheet_range(&self.sheet_name)
            .map_err(|source| ConsolidateError::SheetRead {
                sheet: self.sheet_name.clone(),
                path: path.clone(),
                source,
            })?;

        let mut table = self.read_region(&range);
        debug!(
            "Read {} rows x {} columns from {} ({})",
            table.len(),
            table.width(),
            self.region,
            path
        );

        table.insert_column(0, SOURCE_DESCRIPTION_COLUMN, CellValue::Text(entry.description.clone()))?;
        table.insert_column(1, SOURCE_PATH_COLUMN, CellValue::Text(path))?;

        Ok(table)
    }

    fn read_region(&self, range: &Range<Data>) -> Table {
        let header: Vec<CellValue> = self
            .region
            .columns()
            .map(|col| cell_at(range, self.region.header_row, col))
            .collect();
        let mut table = Table::from_header(self.region.first_col, &header);

        // `end()` is absolute; nothing below it exists in the sheet.
        let Some((last_row, _)) = range.end() else {
            return table;
        };

        for row in self.region.data_row_indices() {
            if row > last_row {
                break;
            }

            // Only rows blank across the whole sheet are dropped. A row with
            // data outside the region is kept, even if empty inside it.
            if row_is_blank(range, row) {
                continue;
            }

            let cells: Vec<CellValue> = self
                .region
                .columns()
                .map(|col| cell_at(range, row, col))
                .collect();
            table.push_row(cells);
        }

        table
    }
}

fn row_is_blank(range: &Range<Data>, row: u32) -> bool {
    let (Some((_, first_col)), Some((_, last_col))) = (range.start(), range.end()) else {
        return true;
    };

    (first_col..=last_col).all(|col| cell_at(range, row, col).is_empty())
}

fn cell_at(range: &Range<Data>, row: u32, col: u32) -> CellValue {
    range
        .get_value((row, col))
        .map(convert_value)
        .unwrap_or(CellValue::Empty)
}

fn convert_value(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Empty,
        Data::Bool(v) => CellValue::Bool(*v),
        Data::Int(v) => CellValue::Int(*v),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(v) => CellValue::Text(v.clone()),
        Data::DateTime(v) => CellValue::DateTime(v.as_f64()),
        Data::DateTimeIso(v) => CellValue::Text(v.clone()),
        Data::DurationIso(v) => CellValue::Text(v.clone()),
        // Error cells (#N/A, #DIV/0!, ...) read as missing values.
        Data::Error(_) => CellValue::Empty,
    }
}
