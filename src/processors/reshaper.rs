use crate::error::{ProcessingError, Result};
use crate::models::{LongRecord, WideTable, YearTable};
use crate::utils::constants::DATETIME_COLUMN;
use crate::utils::parsing::{parse_decimal_cell, parse_timestamp};

/// Melts a wide yearly table into one record per (timestamp, station)
pub struct Reshaper;

impl Reshaper {
    pub fn new() -> Self {
        Self
    }

    /// Output is station-major: every timestamp of the first station, then
    /// the second, and so on. Unparseable values and timestamps become
    /// missing instead of failing.
    pub fn to_long(&self, table: &WideTable) -> Result<YearTable> {
        let datetime = table.datetime_index().ok_or_else(|| {
            ProcessingError::missing_columns(
                format!("wide table {}", table.year),
                vec![DATETIME_COLUMN.to_string()],
            )
        })?;

        let timestamps: Vec<_> = (0..table.row_count())
            .map(|row| table.cell(row, datetime).and_then(parse_timestamp))
            .collect();

        let stations: Vec<(usize, &str)> = table.station_columns().collect();
        let mut records = Vec::with_capacity(timestamps.len() * stations.len());

        for (column, station) in stations {
            for (row, timestamp) in timestamps.iter().enumerate() {
                let value = parse_decimal_cell(table.cell(row, column));
                records.push(LongRecord::new(*timestamp, station, value, table.year));
            }
        }

        Ok(YearTable::new(table.year, records))
    }
}

impl Default for Reshaper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn wide(columns: &[&str], rows: Vec<Vec<Option<&str>>>) -> WideTable {
        WideTable::new(
            2018,
            columns.iter().map(|c| c.to_string()).collect(),
            rows.into_iter()
                .map(|row| row.into_iter().map(|c| c.map(String::from)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_row_count_is_rows_times_stations() {
        let table = wide(
            &["Datetime", "ST01", "ST02", "ST03"],
            vec![
                vec![Some("2018-01-01 01:00:00"), Some("1"), Some("2"), Some("3")],
                vec![Some("2018-01-01 02:00:00"), Some("4"), None, Some("6")],
            ],
        );

        let long = Reshaper::new().to_long(&table).unwrap();
        assert_eq!(long.records.len(), 2 * 3);

        let pairs: HashSet<(String, String)> = long
            .records
            .iter()
            .map(|r| (r.timestamp.unwrap().to_string(), r.station.clone()))
            .collect();
        assert_eq!(pairs.len(), 6);
    }

    #[test]
    fn test_values_are_coerced() {
        let table = wide(
            &["Datetime", "ST01", "ST02", "ST03"],
            vec![vec![
                Some("2018-01-01 01:00:00"),
                Some("10,5"),
                Some("bad"),
                None,
            ]],
        );

        let long = Reshaper::new().to_long(&table).unwrap();
        let values: Vec<Option<f64>> = long.records.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![Some(10.5), None, None]);
        assert!(long.records.iter().all(|r| r.year == 2018));
    }

    #[test]
    fn test_station_major_order() {
        let table = wide(
            &["Datetime", "ST01", "ST02"],
            vec![
                vec![Some("2018-01-01 01:00:00"), Some("1"), Some("3")],
                vec![Some("2018-01-01 02:00:00"), Some("2"), Some("4")],
            ],
        );

        let long = Reshaper::new().to_long(&table).unwrap();
        let stations: Vec<&str> = long.records.iter().map(|r| r.station.as_str()).collect();
        assert_eq!(stations, vec!["ST01", "ST01", "ST02", "ST02"]);
        let values: Vec<f64> = long.records.iter().filter_map(|r| r.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_unparseable_timestamp_is_kept_as_missing() {
        let table = wide(
            &["Datetime", "ST01"],
            vec![vec![Some("garbage"), Some("1")]],
        );
        let long = Reshaper::new().to_long(&table).unwrap();
        assert_eq!(long.records.len(), 1);
        assert!(long.records[0].timestamp.is_none());
    }

    #[test]
    fn test_missing_datetime_column() {
        let table = wide(&["ST01"], vec![vec![Some("10")], vec![Some("20")]]);
        let err = Reshaper::new().to_long(&table).unwrap_err();
        match err {
            ProcessingError::MissingRequiredColumn { columns, .. } => {
                assert_eq!(columns, vec!["Datetime".to_string()]);
            }
            other => panic!("expected MissingRequiredColumn, got {:?}", other),
        }
    }
}
