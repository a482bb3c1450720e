use crate::error::{ConsolidateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Number(f64),
    Bool(bool),
    /// Spreadsheet serial date.
    DateTime(f64),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text used when the value becomes a column label.
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) if s.trim().is_empty() => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
            CellValue::DateTime(d) => Some(d.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// Labelled columns plus rows of cells. Every row has one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds column labels from a header row whose first cell sits in sheet
    /// column `first_col` (0-based). Blanks become `Unnamed: <col>` numbered by
    /// sheet column, and repeated labels get `.1`, `.2`, ... suffixes.
    pub fn from_header(first_col: u32, header: &[CellValue]) -> Self {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut columns = Vec::with_capacity(header.len());

        for (i, cell) in header.iter().enumerate() {
            let base = cell
                .as_label()
                .unwrap_or_else(|| format!("Unnamed: {}", first_col as usize + i));

            let mut label = base.clone();
            while let Some(count) = seen.get(&label).copied() {
                seen.insert(label.clone(), count + 1);
                label = format!("{}.{}", base, count);
            }
            seen.insert(label.clone(), 1);
            columns.push(label);
        }

        Self::new(columns)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    /// Inserts a column at `index` holding `value` in every row.
    pub fn insert_column(&mut self, index: usize, name: &str, value: CellValue) -> Result<()> {
        if self.columns.iter().any(|c| c == name) {
            return Err(ConsolidateError::DuplicateColumn {
                name: name.to_string(),
            });
        }

        let index = index.min(self.columns.len());
        self.columns.insert(index, name.to_string());
        for row in &mut self.rows {
            row.insert(index, value.clone());
        }

        Ok(())
    }

    /// Stacks tables row-wise. Columns are the union of all labels in
    /// first-seen order; cells a table lacks are left empty.
    pub fn concat<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a Table>,
    {
        let tables: Vec<&Table> = tables.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for table in &tables {
            for label in &table.columns {
                if !positions.contains_key(label.as_str()) {
                    positions.insert(label.as_str(), columns.len());
                    columns.push(label.clone());
                }
            }
        }

        let mut out = Self::new(columns.clone());
        for table in &tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .map(|label| positions[label.as_str()])
                .collect();

            for row in &table.rows {
                let mut merged = vec![CellValue::Empty; columns.len()];
                for (cell, &target) in row.iter().zip(&mapping) {
                    merged[target] = cell.clone();
                }
                out.rows.push(merged);
            }
        }

        out
    }
}
