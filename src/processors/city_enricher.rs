use crate::models::{StationRegistry, YearTable};
use tracing::warn;

/// Attaches the registry city to every long record
pub struct CityEnricher<'a> {
    registry: &'a StationRegistry,
}

impl<'a> CityEnricher<'a> {
    pub fn new(registry: &'a StationRegistry) -> Self {
        Self { registry }
    }

    /// Unmapped stations keep a missing city and stay in the table
    pub fn enrich(&self, mut table: YearTable) -> YearTable {
        let mut unmapped = std::collections::BTreeSet::new();

        for record in &mut table.records {
            record.city = self.registry.city_of(&record.station).map(String::from);
            if record.city.is_none() {
                unmapped.insert(record.station.clone());
            }
        }

        if !unmapped.is_empty() {
            warn!(
                "year {}: {} stations without a registry city: {:?}",
                table.year,
                unmapped.len(),
                unmapped
            );
        }

        table
    }
}
