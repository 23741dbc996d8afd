use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::utils::parsing::owning_day;

/// One (timestamp, station) observation of a single year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
    pub timestamp: Option<NaiveDateTime>,
    pub station: String,
    pub value: Option<f64>,
    pub city: Option<String>,
    pub year: i32,
}

impl LongRecord {
    pub fn new(
        timestamp: Option<NaiveDateTime>,
        station: impl Into<String>,
        value: Option<f64>,
        year: i32,
    ) -> Self {
        Self {
            timestamp,
            station: station.into(),
            value,
            city: None,
            year,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Convert into a panel record; `None` when timestamp or value is missing
    pub fn into_combined(self) -> Option<CombinedRecord> {
        let timestamp = self.timestamp?;
        let value = self.value?;
        let date = owning_day(timestamp);

        Some(CombinedRecord {
            station: self.station,
            city: self.city,
            value,
            year: self.year,
            month: date.month(),
            date,
        })
    }
}

/// All long records produced from one year's sheet
#[derive(Debug, Clone, Default)]
pub struct YearTable {
    pub year: i32,
    pub records: Vec<LongRecord>,
}

impl YearTable {
    pub fn new(year: i32, records: Vec<LongRecord>) -> Self {
        Self { year, records }
    }

    pub fn stations(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.station.as_str()).collect()
    }

    pub fn cities(&self) -> BTreeSet<&str> {
        self.records.iter().filter_map(|r| r.city.as_deref()).collect()
    }

    pub fn missing_values(&self) -> usize {
        self.records.iter().filter(|r| r.value.is_none()).count()
    }
}

/// Row of the persisted combined dataset, column order as written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub station: String,
    pub city: Option<String>,
    pub value: f64,
    pub year: i32,
    pub month: u32,
    pub date: NaiveDate,
}

impl CombinedRecord {
    pub fn new(
        station: impl Into<String>,
        city: Option<String>,
        value: f64,
        year: i32,
        date: NaiveDate,
    ) -> Self {
        Self {
            station: station.into(),
            city,
            value,
            year,
            month: date.month(),
            date,
        }
    }
}

/// Cross-year panel restricted to stations present in every year
#[derive(Debug, Clone, Default)]
pub struct CombinedDataset {
    pub years: Vec<i32>,
    pub stations: BTreeSet<String>,
    pub records: Vec<CombinedRecord>,
}

impl CombinedDataset {
    /// Rebuild the year and station index from persisted records
    pub fn from_records(records: Vec<CombinedRecord>) -> Self {
        let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
        let stations = records.iter().map(|r| r.station.clone()).collect();

        Self {
            years: years.into_iter().collect(),
            stations,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_into_combined_applies_day_boundary() {
        let record = LongRecord::new(Some(at("2024-02-01 00:00")), "ST01", Some(12.0), 2024)
            .with_city("Warszawa");

        let combined = record.into_combined().unwrap();
        assert_eq!(combined.date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(combined.month, 1);
        assert_eq!(combined.city.as_deref(), Some("Warszawa"));
    }

    #[test]
    fn test_into_combined_requires_timestamp_and_value() {
        assert!(LongRecord::new(None, "ST01", Some(1.0), 2024)
            .into_combined()
            .is_none());
        assert!(LongRecord::new(Some(at("2024-01-01 05:00")), "ST01", None, 2024)
            .into_combined()
            .is_none());
    }

    #[test]
    fn test_year_table_summaries() {
        let table = YearTable::new(
            2018,
            vec![
                LongRecord::new(None, "ST01", Some(1.0), 2018).with_city("Warszawa"),
                LongRecord::new(None, "ST02", None, 2018),
                LongRecord::new(None, "ST01", None, 2018).with_city("Warszawa"),
            ],
        );

        assert_eq!(table.stations().len(), 2);
        assert_eq!(table.cities().len(), 1);
        assert_eq!(table.missing_values(), 2);
    }

    #[test]
    fn test_dataset_from_records_indexes_years_and_stations() {
        let date = NaiveDate::from_ymd_opt(2015, 3, 4).unwrap();
        let dataset = CombinedDataset::from_records(vec![
            CombinedRecord::new("ST02", None, 1.0, 2024, date),
            CombinedRecord::new("ST01", None, 2.0, 2015, date),
            CombinedRecord::new("ST01", None, 3.0, 2024, date),
        ]);

        assert_eq!(dataset.years, vec![2015, 2024]);
        assert_eq!(dataset.stations.len(), 2);
        assert_eq!(dataset.records.iter().filter(|r| r.year == 2024).count(), 2);
    }
}
