use crate::error::Result;
use crate::models::table::to_cell;
use crate::models::RawTable;
use crate::utils::encoding::{decode_text, sniff_delimiter};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Reads a yearly sheet exported to CSV, metadata rows included
pub struct RawTableReader {
    pandas_index: bool,
    use_mmap: bool,
}

impl RawTableReader {
    pub fn new() -> Self {
        Self {
            pandas_index: false,
            use_mmap: false,
        }
    }

    /// Exports written by pandas carry a column-label row and an index column
    pub fn with_pandas_index(mut self, pandas_index: bool) -> Self {
        self.pandas_index = pandas_index;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn read(&self, path: &Path) -> Result<RawTable> {
        let text = if self.use_mmap {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            decode_text(&mmap)
        } else {
            decode_text(&std::fs::read(path)?)
        };

        let table = self.parse_str(&text)?;
        debug!("read {} raw rows from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn parse_str(&self, text: &str) -> Result<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(sniff_delimiter(text))
            .from_reader(text.as_bytes());

        let skip_columns = usize::from(self.pandas_index);
        let mut rows = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if self.pandas_index && index == 0 {
                continue;
            }
            rows.push(record.iter().skip(skip_columns).map(to_cell).collect());
        }

        Ok(RawTable::new(rows))
    }
}

impl Default for RawTableReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_semicolon_export_with_decimal_commas() {
        let text = "Kod stacji;ST01;ST02\n\
                    Wskaźnik;PM2.5;PM2.5\n\
                    Czas uśredniania;1g;1g\n\
                    2015-01-01 01:00:00;10,5;\n";

        let table = RawTableReader::new().parse_str(text).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.rows[3][1].as_deref(), Some("10,5"));
        assert_eq!(table.rows[3][2], None);
    }

    #[test]
    fn test_parse_pandas_dump_drops_label_row_and_index() {
        let text = ",0,1,2\n\
                    0,Kod stacji,ST01,ST02\n\
                    1,Wskaźnik,PM2.5,PM2.5\n\
                    2,Czas uśredniania,1g,1g\n\
                    3,2015-01-01 01:00:00,10,20\n";

        let table = RawTableReader::new()
            .with_pandas_index(true)
            .parse_str(text)
            .unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.rows[0][0].as_deref(), Some("Kod stacji"));
        assert_eq!(table.rows[3][2].as_deref(), Some("20"));
    }

    #[test]
    fn test_read_file_buffered_and_mmap() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "Kod stacji,ST01")?;
        writeln!(temp_file, "Wskaźnik,PM2.5")?;
        writeln!(temp_file, "Czas uśredniania,1g")?;
        writeln!(temp_file, "2015-01-01 01:00:00,\"12,5\"")?;

        let buffered = RawTableReader::new().read(temp_file.path())?;
        let mapped = RawTableReader::new().with_mmap(true).read(temp_file.path())?;

        assert_eq!(buffered, mapped);
        assert_eq!(buffered.rows[3][1].as_deref(), Some("12,5"));
        Ok(())
    }

    #[test]
    fn test_read_windows_1250_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Kod stacji;ST01\nWska\x9fnik;PM2.5\n")?;

        let table = RawTableReader::new().read(temp_file.path())?;
        assert_eq!(table.rows[1][0].as_deref(), Some("Wskaźnik"));
        Ok(())
    }
}
