use crate::error::{ProcessingError, Result};
use crate::models::{Cell, RawTable, SchemaLayout, WideTable};
use crate::utils::constants::{DATETIME_COLUMN, DEFAULT_SCHEMA_CUTOFF_YEAR};
use std::sync::Mutex;
use tracing::info;

/// Receives the share of missing cells per cleaned column
pub trait MissingnessSink: Send + Sync {
    fn report(&self, year: i32, column: &str, fraction: f64);
}

/// Writes missingness to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl MissingnessSink for TracingSink {
    fn report(&self, year: i32, column: &str, fraction: f64) {
        info!("year {} missing in {}: {:.2}%", year, column, fraction * 100.0);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMissingness {
    pub year: i32,
    pub column: String,
    pub fraction: f64,
}

/// Collects missingness in memory, e.g. for the integrity report
#[derive(Debug, Default)]
pub struct MissingnessReport {
    entries: Mutex<Vec<ColumnMissingness>>,
}

impl MissingnessReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ColumnMissingness> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        entries.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.column.cmp(&b.column)));
        entries
    }

    pub fn fraction(&self, year: i32, column: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|entry| entry.year == year && entry.column == column)
            .map(|entry| entry.fraction)
    }
}

impl MissingnessSink for MissingnessReport {
    fn report(&self, year: i32, column: &str, fraction: f64) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(ColumnMissingness {
                year,
                column: column.to_string(),
                fraction,
            });
    }
}

/// Strips the agency metadata block from a raw yearly sheet
pub struct TableCleaner {
    cutoff_year: i32,
}

impl TableCleaner {
    pub fn new() -> Self {
        Self {
            cutoff_year: DEFAULT_SCHEMA_CUTOFF_YEAR,
        }
    }

    pub fn with_cutoff_year(cutoff_year: i32) -> Self {
        Self { cutoff_year }
    }

    pub fn layout_for(&self, year: i32) -> SchemaLayout {
        SchemaLayout::for_year(year, self.cutoff_year)
    }

    /// Clean one year's sheet into a `Datetime` + station-code table
    pub fn clean(
        &self,
        raw: &RawTable,
        year: i32,
        sink: &dyn MissingnessSink,
    ) -> Result<WideTable> {
        let layout = self.layout_for(year);

        if raw.len() < layout.metadata_rows() {
            return Err(ProcessingError::malformed(
                year,
                format!(
                    "{:?} layout needs at least {} metadata rows, found {}",
                    layout.version,
                    layout.metadata_rows(),
                    raw.len()
                ),
            ));
        }

        let columns = self.header_columns(&raw.rows[layout.header_row()], year)?;
        let width = columns.len();

        let rows = raw.rows[layout.metadata_rows()..]
            .iter()
            .enumerate()
            .map(|(index, row)| Self::fit_row(row, width, year, index))
            .collect::<Result<Vec<_>>>()?;

        let table = WideTable::new(year, columns, rows);
        Self::report_missingness(&table, sink);

        Ok(table)
    }

    /// Header cells become column names; the first is always `Datetime`
    fn header_columns(&self, header: &[Cell], year: i32) -> Result<Vec<String>> {
        let used = header
            .iter()
            .rposition(|cell| cell.is_some())
            .map_or(0, |last| last + 1);

        if used < 2 {
            return Err(ProcessingError::malformed(
                year,
                "station code row contains no station columns",
            ));
        }

        let mut columns = Vec::with_capacity(used);
        columns.push(DATETIME_COLUMN.to_string());

        for (index, cell) in header.iter().enumerate().take(used).skip(1) {
            match cell {
                Some(code) => columns.push(code.clone()),
                None => {
                    return Err(ProcessingError::malformed(
                        year,
                        format!("empty station code in header column {}", index),
                    ))
                }
            }
        }

        Ok(columns)
    }

    /// Pad short rows; trailing cells beyond the header must be empty
    fn fit_row(row: &[Cell], width: usize, year: i32, index: usize) -> Result<Vec<Cell>> {
        if row.len() > width && row[width..].iter().any(|cell| cell.is_some()) {
            return Err(ProcessingError::malformed(
                year,
                format!(
                    "data row {} has {} cells but the header has {} columns",
                    index,
                    row.len(),
                    width
                ),
            ));
        }

        let mut cells: Vec<Cell> = row.iter().take(width).cloned().collect();
        cells.resize(width, None);
        Ok(cells)
    }

    fn report_missingness(table: &WideTable, sink: &dyn MissingnessSink) {
        let total = table.row_count();

        for (index, column) in table.columns.iter().enumerate() {
            let missing = table
                .rows
                .iter()
                .filter(|row| row[index].is_none())
                .count();
            let fraction = if total == 0 {
                0.0
            } else {
                missing as f64 / total as f64
            };
            sink.report(table.year, column, fraction);
        }
    }
}

impl Default for TableCleaner {
    fn default() -> Self {
        Self::new()
    }
}
