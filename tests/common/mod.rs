#![allow(dead_code)]

use calamine::{open_workbook, Data, Reader, Xlsx};
use pcat_efeito::{Config, SourceEntry};
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Writes a workbook whose `sheet` holds a header row and data rows in
/// columns A and B.
pub fn write_pcat(path: &Path, sheet: &str, header: [&str; 2], rows: &[(&str, f64)]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).unwrap();
    worksheet.write_string(0, 0, header[0]).unwrap();
    worksheet.write_string(0, 1, header[1]).unwrap();
    for (i, (label, value)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string(row, 0, *label).unwrap();
        worksheet.write_number(row, 1, *value).unwrap();
    }
    workbook.save(path).unwrap();
}

pub fn write_simple(path: &Path, label: &str, value: f64) {
    write_pcat(path, "EFEITO", ["Indicador", "Valor"], &[(label, value)]);
}

/// Configuration reading A1:B2 (header plus one data row) for 2019-2021,
/// writing under `base`.
pub fn test_config(base: &Path, files: Vec<SourceEntry>) -> Config {
    let mut config = Config::default();
    config.extraction.start_col = "A".to_string();
    config.extraction.end_col = "B".to_string();
    config.extraction.start_row = 1;
    config.extraction.end_row = 1;
    config.extraction.years = vec![2019, 2020, 2021];
    config.output.base_directory = base.to_path_buf();
    config.logging.log_file = base.join("efeito_extraction.log");
    config.files = files;
    config
}

pub fn sheet_names(path: &Path) -> Vec<String> {
    let workbook: Xlsx<_> = open_workbook(path).unwrap();
    workbook.sheet_names()
}

/// Every cell of `sheet` rendered as text, row by row.
pub fn read_sheet(path: &Path, sheet: &str) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range(sheet).unwrap();
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}
