use crate::error::{ProcessingError, Result};
use crate::models::{StationRegistry, WideTable};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Historical → current station code lookup, built once per registry
#[derive(Debug, Clone, Default)]
pub struct StationCodeMapping {
    renames: HashMap<String, String>,
}

impl StationCodeMapping {
    pub fn from_registry(registry: &StationRegistry) -> Self {
        let renames = registry
            .entries()
            .iter()
            .filter_map(|entry| {
                entry
                    .alias()
                    .map(|alias| (alias.to_string(), entry.current_code.clone()))
            })
            .collect();

        Self { renames }
    }

    pub fn current_code<'a>(&'a self, code: &'a str) -> &'a str {
        self.renames.get(code).map_or(code, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}

/// Renames historical station columns to their current codes
pub struct CodeNormalizer<'a> {
    mapping: &'a StationCodeMapping,
}

impl<'a> CodeNormalizer<'a> {
    pub fn new(mapping: &'a StationCodeMapping) -> Self {
        Self { mapping }
    }

    /// Rename columns in place; a rename that collides with an existing
    /// column is rejected instead of overwriting it.
    pub fn normalize(&self, mut table: WideTable) -> Result<WideTable> {
        let datetime = table.datetime_index();
        let mut seen = HashSet::with_capacity(table.columns.len());
        let mut renamed = 0usize;

        for (index, column) in table.columns.iter_mut().enumerate() {
            if Some(index) != datetime {
                let current = self.mapping.current_code(column).to_string();
                if current != *column {
                    debug!("year {}: station {} -> {}", table.year, column, current);
                    *column = current;
                    renamed += 1;
                }
            }

            if !seen.insert(column.clone()) {
                return Err(ProcessingError::DuplicateColumn {
                    year: table.year,
                    column: column.clone(),
                });
            }
        }

        debug!("year {}: renamed {} station columns", table.year, renamed);
        Ok(table)
    }
}
