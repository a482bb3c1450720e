use crate::config::SourceEntry;
use crate::extractor::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How an entry's year was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "year")]
pub enum YearAssignment {
    /// Taken from the entry's `year` field.
    Tagged(u16),
    /// First configured year found in the path.
    Inferred(u16),
    Unassigned,
}

impl YearAssignment {
    pub fn year(&self) -> Option<u16> {
        match self {
            YearAssignment::Tagged(year) | YearAssignment::Inferred(year) => Some(*year),
            YearAssignment::Unassigned => None,
        }
    }
}

/// Decides which configured year owns `entry`.
///
/// An explicit tag wins when it names a configured year. Otherwise the years
/// are tried in configured order and the first whose decimal string occurs
/// in the path is used.
pub fn resolve_year(entry: &SourceEntry, years: &[u16]) -> YearAssignment {
    if let Some(tag) = entry.year {
        if years.contains(&tag) {
            return YearAssignment::Tagged(tag);
        }
        return YearAssignment::Unassigned;
    }

    let path = entry.path.to_string_lossy();
    years
        .iter()
        .find(|year| path.contains(&year.to_string()))
        .map(|year| YearAssignment::Inferred(*year))
        .unwrap_or(YearAssignment::Unassigned)
}

/// A table kept out of every year sheet, with where it came from.
#[derive(Debug, Clone)]
pub struct UnassignedTable {
    pub entry: SourceEntry,
    pub table: Table,
}

/// Per-year ordered lists of extracted tables.
#[derive(Debug, Clone)]
pub struct YearBuckets {
    order: Vec<u16>,
    buckets: BTreeMap<u16, Vec<Table>>,
    unassigned: Vec<UnassignedTable>,
}

impl YearBuckets {
    pub fn new(years: &[u16]) -> Self {
        let mut order = Vec::with_capacity(years.len());
        let mut buckets = BTreeMap::new();
        for year in years {
            if buckets.insert(*year, Vec::new()).is_none() {
                order.push(*year);
            }
        }

        Self {
            order,
            buckets,
            unassigned: Vec::new(),
        }
    }

    pub fn years(&self) -> &[u16] {
        &self.order
    }

    /// Appends `table` to the bucket named by `assignment`, or to the
    /// unassigned list.
    pub fn add(&mut self, assignment: YearAssignment, entry: &SourceEntry, table: Table) {
        match assignment.year().and_then(|year| self.buckets.get_mut(&year)) {
            Some(bucket) => bucket.push(table),
            None => self.unassigned.push(UnassignedTable {
                entry: entry.clone(),
                table,
            }),
        }
    }

    pub fn tables(&self, year: u16) -> &[Table] {
        self.buckets.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn unassigned(&self) -> &[UnassignedTable] {
        &self.unassigned
    }

    pub fn has_data(&self) -> bool {
        self.buckets.values().any(|tables| !tables.is_empty())
    }

    /// Years in configured order, each with its concatenated tables; `None`
    /// for a year with no data.
    pub fn consolidated(&self) -> impl Iterator<Item = (u16, Option<Table>)> + '_ {
        self.order.iter().map(move |year| {
            let tables = self.tables(*year);
            let table = if tables.is_empty() {
                None
            } else {
                Some(Table::concat(tables))
            };
            (*year, table)
        })
    }
}
