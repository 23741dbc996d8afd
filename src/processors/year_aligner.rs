use crate::error::{ProcessingError, Result};
use crate::models::{CombinedDataset, YearTable};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// What the aligner kept and discarded
#[derive(Debug, Clone, Default)]
pub struct AlignmentStats {
    /// Distinct stations published per year, after code normalization
    pub stations_per_year: BTreeMap<i32, usize>,
    /// Records whose station is outside the common panel
    pub excluded_station_records: usize,
    /// Panel records dropped for a missing timestamp or value
    pub incomplete_records: usize,
}

/// Builds the cross-year station panel
pub struct YearAligner;

impl YearAligner {
    pub fn new() -> Self {
        Self
    }

    /// Stations present in every supplied year
    pub fn common_stations(&self, tables: &[YearTable]) -> BTreeSet<String> {
        let mut tables_iter = tables.iter();
        let Some(first) = tables_iter.next() else {
            return BTreeSet::new();
        };

        let mut common: BTreeSet<String> =
            first.stations().into_iter().map(String::from).collect();
        for table in tables_iter {
            let stations = table.stations();
            common.retain(|station| stations.contains(station.as_str()));
        }

        common
    }

    /// Restrict every year to the common panel, concatenate in year order,
    /// drop records without timestamp or value and derive `date`/`month`.
    pub fn align(&self, mut tables: Vec<YearTable>) -> Result<(CombinedDataset, AlignmentStats)> {
        if tables.is_empty() {
            return Err(ProcessingError::MissingData(
                "no yearly tables to align".to_string(),
            ));
        }

        tables.sort_by_key(|table| table.year);

        let common = self.common_stations(&tables);
        let mut stats = AlignmentStats::default();
        let mut records = Vec::new();
        let mut years = Vec::with_capacity(tables.len());

        info!(
            "{} stations common to all {} years",
            common.len(),
            tables.len()
        );

        for table in tables {
            stats
                .stations_per_year
                .insert(table.year, table.stations().len());
            years.push(table.year);

            for record in table.records {
                if !common.contains(&record.station) {
                    stats.excluded_station_records += 1;
                    continue;
                }
                match record.into_combined() {
                    Some(combined) => records.push(combined),
                    None => stats.incomplete_records += 1,
                }
            }
        }

        years.dedup();
        info!(
            "combined panel: {} records, {} excluded by station, {} incomplete",
            records.len(),
            stats.excluded_station_records,
            stats.incomplete_records
        );

        let dataset = CombinedDataset {
            years,
            stations: common,
            records,
        };

        Ok((dataset, stats))
    }
}

impl Default for YearAligner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LongRecord;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(raw: &str) -> Option<NaiveDateTime> {
        Some(NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").unwrap())
    }

    fn year(year: i32, stations: &[&str]) -> YearTable {
        let stamp = format!("{}-03-10 12:00", year);
        YearTable::new(
            year,
            stations
                .iter()
                .map(|s| LongRecord::new(at(&stamp), *s, Some(5.0), year))
                .collect(),
        )
    }

    #[test]
    fn test_station_in_nine_of_ten_years_is_dropped() {
        let mut tables: Vec<YearTable> = (2015..2024).map(|y| year(y, &["A", "B"])).collect();
        tables.push(year(2024, &["A"]));

        let (dataset, stats) = YearAligner::new().align(tables).unwrap();

        assert_eq!(dataset.stations, BTreeSet::from(["A".to_string()]));
        assert!(dataset.records.iter().all(|r| r.station == "A"));
        assert_eq!(dataset.records.len(), 10);
        assert_eq!(stats.excluded_station_records, 9);
        assert_eq!(dataset.years.len(), 10);
    }

    #[test]
    fn test_common_stations_is_exact_intersection() {
        let tables = vec![
            year(2015, &["A", "B", "C"]),
            year(2018, &["B", "C", "D"]),
            year(2021, &["C", "B", "E"]),
        ];
        let common = YearAligner::new().common_stations(&tables);
        assert_eq!(
            common,
            BTreeSet::from(["B".to_string(), "C".to_string()])
        );
    }

    #[test]
    fn test_incomplete_records_are_dropped() {
        let table = YearTable::new(
            2024,
            vec![
                LongRecord::new(at("2024-01-02 00:00"), "A", Some(1.0), 2024),
                LongRecord::new(at("2024-01-02 01:00"), "A", None, 2024),
                LongRecord::new(None, "A", Some(3.0), 2024),
                LongRecord::new(at("2024-01-02 01:00"), "A", Some(4.0), 2024),
            ],
        );

        let (dataset, stats) = YearAligner::new().align(vec![table]).unwrap();

        assert_eq!(dataset.records.len(), 2);
        assert_eq!(stats.incomplete_records, 2);
        assert_eq!(
            dataset.records[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            dataset.records[1].date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_years_concatenated_in_order() {
        let tables = vec![year(2024, &["A"]), year(2015, &["A"])];
        let (dataset, _) = YearAligner::new().align(tables).unwrap();
        let years: Vec<i32> = dataset.records.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2015, 2024]);
        assert_eq!(dataset.years, vec![2015, 2024]);
    }

    #[test]
    fn test_no_tables_is_an_error() {
        assert!(matches!(
            YearAligner::new().align(Vec::new()),
            Err(ProcessingError::MissingData(_))
        ));
    }
}
