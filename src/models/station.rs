use crate::error::{ProcessingError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// One row of the GIOŚ station metadata sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RegistryEntry {
    #[validate(length(min = 1))]
    pub current_code: String,

    pub historical_code: Option<String>,

    pub city: Option<String>,

    pub region: Option<String>,
}

impl RegistryEntry {
    pub fn new(
        current_code: impl Into<String>,
        historical_code: Option<String>,
        city: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            current_code: current_code.into(),
            historical_code: historical_code.filter(|code| !code.trim().is_empty()),
            city: non_blank(city.into()),
            region: non_blank(region.into()),
        }
    }

    /// Historical alias, if it differs from the current code
    pub fn alias(&self) -> Option<&str> {
        self.historical_code
            .as_deref()
            .filter(|code| *code != self.current_code)
    }
}

fn non_blank(value: String) -> Option<String> {
    Some(value).filter(|v| !v.trim().is_empty())
}

/// Read-only lookup over registry entries keyed by current station code
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    entries: Vec<RegistryEntry>,
    by_code: HashMap<String, usize>,
}

impl StationRegistry {
    /// Build the registry, rejecting duplicate current codes and
    /// historical codes claimed by more than one station.
    pub fn from_entries(entries: Vec<RegistryEntry>) -> Result<Self> {
        let mut by_code = HashMap::with_capacity(entries.len());
        let mut aliases: HashMap<&str, &str> = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            entry.validate()?;

            if by_code.insert(entry.current_code.clone(), index).is_some() {
                return Err(ProcessingError::InvalidRegistry(format!(
                    "station code '{}' appears more than once",
                    entry.current_code
                )));
            }

            if let Some(alias) = entry.alias() {
                if let Some(previous) = aliases.insert(alias, &entry.current_code) {
                    if previous != entry.current_code {
                        return Err(ProcessingError::InvalidRegistry(format!(
                            "historical code '{}' maps to both '{}' and '{}'",
                            alias, previous, entry.current_code
                        )));
                    }
                }
            }
        }

        Ok(Self { entries, by_code })
    }

    pub fn get(&self, current_code: &str) -> Option<&RegistryEntry> {
        self.by_code
            .get(current_code)
            .map(|&index| &self.entries[index])
    }

    /// City of a registered station; blank registry cells count as missing
    pub fn city_of(&self, current_code: &str) -> Option<&str> {
        self.get(current_code).and_then(|entry| entry.city.as_deref())
    }

    pub fn region_of(&self, current_code: &str) -> Option<&str> {
        self.get(current_code).and_then(|entry| entry.region.as_deref())
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, old: Option<&str>, city: &str) -> RegistryEntry {
        RegistryEntry::new(code, old.map(String::from), city, "Mazowieckie")
    }

    #[test]
    fn test_registry_lookup() {
        let registry = StationRegistry::from_entries(vec![
            entry("ST01", Some("OLD001"), "Warszawa"),
            entry("ST02", None, "Katowice"),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.city_of("ST01"), Some("Warszawa"));
        assert_eq!(registry.region_of("ST02"), Some("Mazowieckie"));
        assert_eq!(registry.city_of("OLD001"), None);
        assert_eq!(registry.city_of("UNKNOWN"), None);
    }

    #[test]
    fn test_duplicate_current_code_rejected() {
        let result = StationRegistry::from_entries(vec![
            entry("ST01", None, "Warszawa"),
            entry("ST01", None, "Katowice"),
        ]);
        assert!(matches!(result, Err(ProcessingError::InvalidRegistry(_))));
    }

    #[test]
    fn test_alias_claimed_twice_rejected() {
        let result = StationRegistry::from_entries(vec![
            entry("ST01", Some("OLD001"), "Warszawa"),
            entry("ST02", Some("OLD001"), "Katowice"),
        ]);
        assert!(matches!(result, Err(ProcessingError::InvalidRegistry(_))));
    }

    #[test]
    fn test_blank_historical_code_is_none() {
        let station = entry("ST01", Some("  "), "Warszawa");
        assert_eq!(station.historical_code, None);
        assert_eq!(station.alias(), None);
    }

    #[test]
    fn test_historical_code_equal_to_current_is_not_alias() {
        let station = entry("ST01", Some("ST01"), "Warszawa");
        assert_eq!(station.alias(), None);
    }

    #[test]
    fn test_blank_city_and_region_are_missing() {
        let registry = StationRegistry::from_entries(vec![
            RegistryEntry::new("ST09", None, "", " "),
            entry("ST01", None, "Warszawa"),
        ])
        .unwrap();

        assert!(registry.get("ST09").is_some());
        assert_eq!(registry.city_of("ST09"), None);
        assert_eq!(registry.region_of("ST09"), None);
        assert_eq!(registry.city_of("ST01"), Some("Warszawa"));
    }

    #[test]
    fn test_empty_current_code_fails_validation() {
        let result = StationRegistry::from_entries(vec![entry("", None, "Warszawa")]);
        assert!(matches!(result, Err(ProcessingError::Validation(_))));
    }
}
