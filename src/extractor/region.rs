use crate::config::ExtractionConfig;
use crate::error::{ConsolidateError, Result};

/// Largest column index a worksheet can address (`XFD`).
const MAX_COLUMN_INDEX: u32 = 16_383;

/// Converts a column label such as `A`, `Z` or `AI` into a 0-based index.
pub fn column_index(label: &str) -> Result<u32> {
    let label = label.trim();
    if label.is_empty() || !label.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConsolidateError::InvalidColumn {
            label: label.to_string(),
        });
    }

    let mut index: u32 = 0;
    for c in label.chars() {
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .filter(|i| *i - 1 <= MAX_COLUMN_INDEX)
            .ok_or_else(|| ConsolidateError::InvalidColumn {
                label: label.to_string(),
            })?;
    }

    Ok(index - 1)
}

/// Converts a 0-based column index back into its letter label.
pub fn column_label(mut index: u32) -> String {
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// Rectangle read from a worksheet, in 0-based absolute coordinates.
///
/// The first row is the header row; up to `data_rows` rows follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub header_row: u32,
    pub data_rows: u32,
    pub first_col: u32,
    pub last_col: u32,
}

impl Region {
    /// Skips `start_row - 1` rows, reads a header, then
    /// `end_row - start_row + 1` data rows.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let first_col = column_index(&config.start_col)?;
        let last_col = column_index(&config.end_col)?;

        if first_col > last_col || config.start_row == 0 || config.start_row > config.end_row {
            return Err(ConsolidateError::Config {
                message: format!(
                    "Invalid region {}{}:{}{}",
                    config.start_col, config.start_row, config.end_col, config.end_row
                ),
            });
        }

        Ok(Self {
            header_row: config.start_row - 1,
            data_rows: config.end_row - config.start_row + 1,
            first_col,
            last_col,
        })
    }

    pub fn width(&self) -> usize {
        (self.last_col - self.first_col + 1) as usize
    }

    pub fn columns(&self) -> impl Iterator<Item = u32> {
        self.first_col..=self.last_col
    }

    pub fn data_row_indices(&self) -> impl Iterator<Item = u32> {
        let first = self.header_row + 1;
        first..first + self.data_rows
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            column_label(self.first_col),
            self.header_row + 1,
            column_label(self.last_col),
            self.header_row + 1 + self.data_rows
        )
    }
}
