use crate::error::Result;
use crate::models::{CombinedDataset, CombinedRecord};
use crate::readers::columns::require_columns;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Columns every persisted combined dataset must carry
pub const COMBINED_COLUMNS: [&str; 6] = ["station", "city", "value", "year", "month", "date"];

/// Reads a previously persisted combined dataset back into memory
pub struct CombinedReader;

impl CombinedReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_dataset(&self, path: &Path) -> Result<CombinedDataset> {
        let dataset = self.read_from(File::open(path)?)?;
        info!(
            "loaded {} combined records ({} stations) from {}",
            dataset.len(),
            dataset.stations.len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn read_from<R: Read>(&self, input: R) -> Result<CombinedDataset> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        let names: Vec<&str> = headers.iter().collect();
        require_columns("combined dataset", names.iter().copied(), &COMBINED_COLUMNS)?;

        let records = reader
            .deserialize::<CombinedRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(CombinedDataset::from_records(records))
    }
}

impl Default for CombinedReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use chrono::NaiveDate;

    #[test]
    fn test_read_combined_csv() {
        let text = "station,city,value,year,month,date\n\
                    ST01,Warszawa,12.5,2024,1,2024-01-01\n\
                    ST99,,7.0,2024,1,2024-01-02\n";

        let dataset = CombinedReader::new().read_from(text.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.years, vec![2024]);
        assert_eq!(dataset.records[0].city.as_deref(), Some("Warszawa"));
        assert_eq!(dataset.records[1].city, None);
        assert_eq!(
            dataset.records[1].date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_missing_columns_are_listed() {
        let text = "station,value,year\nST01,1.0,2024\n";
        let err = CombinedReader::new().read_from(text.as_bytes()).unwrap_err();
        match err {
            ProcessingError::MissingRequiredColumn { columns, .. } => {
                assert_eq!(columns, vec!["city", "month", "date"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
