use crate::error::Result;
use crate::models::table::to_cell;
use crate::models::{RegistryEntry, StationRegistry};
use crate::readers::columns::{find_column, require_columns};
use crate::utils::constants::{
    REGISTRY_CITY, REGISTRY_CURRENT_CODE, REGISTRY_HISTORICAL_CODE, REGISTRY_REGION,
};
use crate::utils::encoding::{decode_text, sniff_delimiter};
use std::path::Path;
use tracing::{debug, info, warn};

const REGISTRY_TABLE: &str = "station registry";

/// Reads the station metadata sheet (exported to CSV)
pub struct RegistryReader;

impl RegistryReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_registry(&self, path: &Path) -> Result<StationRegistry> {
        let text = decode_text(&std::fs::read(path)?);
        let registry = self.parse_str(&text)?;
        info!(
            "loaded {} stations from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn parse_str(&self, text: &str) -> Result<StationRegistry> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(sniff_delimiter(text))
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let names: Vec<&str> = headers.iter().collect();

        let required = require_columns(
            REGISTRY_TABLE,
            names.iter().copied(),
            &[REGISTRY_CURRENT_CODE, REGISTRY_CITY, REGISTRY_REGION],
        )?;
        let (code_col, city_col, region_col) = (required[0], required[1], required[2]);

        let historical_col = find_column(names.iter().copied(), REGISTRY_HISTORICAL_CODE);
        if historical_col.is_none() {
            warn!("registry has no '{}' column; no codes will be renamed", REGISTRY_HISTORICAL_CODE);
        }

        let mut entries = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let field = |index: usize| record.get(index).and_then(to_cell);

            // Skip rows without a station code (blank lines, footnotes)
            let Some(code) = field(code_col) else {
                debug!("registry row {} has no station code, skipped", line + 1);
                continue;
            };

            entries.push(RegistryEntry::new(
                code,
                historical_col.and_then(field),
                field(city_col).unwrap_or_default(),
                field(region_col).unwrap_or_default(),
            ));
        }

        StationRegistry::from_entries(entries)
    }
}

impl Default for RegistryReader {
    fn default() -> Self {
        Self::new()
    }
}
