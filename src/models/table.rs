use crate::utils::constants::DATETIME_COLUMN;

/// A cell as read from a sheet export; empty cells are `None`
pub type Cell = Option<String>;

/// Untyped sheet rows as published, metadata rows included
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Convenience constructor from string literals; empty strings become `None`
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| to_cell(cell.as_ref())).collect())
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Normalise a raw string into a cell
pub fn to_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Cleaned per-year table: a timestamp column followed by one column per station
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    pub year: i32,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl WideTable {
    pub fn new(year: i32, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            year,
            columns,
            rows,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn datetime_index(&self) -> Option<usize> {
        self.column_index(DATETIME_COLUMN)
    }

    /// Station columns, i.e. every column except the timestamp
    pub fn station_columns(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        let datetime = self.datetime_index();
        self.columns
            .iter()
            .enumerate()
            .filter(move |(index, _)| Some(*index) != datetime)
            .map(|(index, name)| (index, name.as_str()))
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .and_then(|cell| cell.as_deref())
    }

    /// Values of a column by name, `None` when the column is absent
    pub fn column_values(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let index = self.column_index(name)?;
        Some(
            (0..self.rows.len())
                .map(|row| self.cell(row, index))
                .collect(),
        )
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
