use crate::analyzers::{AnalysisOutputs, AnalysisSummary};
use crate::error::Result;
use crate::models::CombinedDataset;
use crate::utils::constants::{
    CITY_MONTHLY_FILE, COMBINED_FILE, DEFAULT_BUFFER_SIZE, EXCEEDANCE_FILE, HEATMAP_FILE,
    MONTHLY_FILE, REGIONAL_FILE, SUMMARY_FILE, TREND_FILE,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Writes pipeline artifacts as headed CSV files under one directory
pub struct CsvWriter {
    output_dir: PathBuf,
}

impl CsvWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Serialize `records` to `file_name`; columns follow field order
    pub fn write_records<T: Serialize>(&self, file_name: &str, records: &[T]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);

        let mut writer = csv::WriterBuilder::new()
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .from_path(&path)?;

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!("wrote {} rows to {}", records.len(), path.display());
        Ok(path)
    }

    pub fn write_combined(&self, dataset: &CombinedDataset) -> Result<PathBuf> {
        self.write_records(COMBINED_FILE, &dataset.records)
    }

    /// Every aggregate table, in a fixed order
    pub fn write_outputs(&self, outputs: &AnalysisOutputs) -> Result<Vec<PathBuf>> {
        Ok(vec![
            self.write_records(MONTHLY_FILE, &outputs.monthly)?,
            self.write_records(CITY_MONTHLY_FILE, &outputs.city_monthly)?,
            self.write_records(EXCEEDANCE_FILE, &outputs.exceedance)?,
            self.write_records(REGIONAL_FILE, &outputs.regional)?,
            self.write_records(TREND_FILE, &outputs.trend)?,
            self.write_records(HEATMAP_FILE, &outputs.heatmap)?,
        ])
    }

    pub fn write_summary(&self, summary: &AnalysisSummary) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(SUMMARY_FILE);
        std::fs::write(&path, summary.to_json()?)?;
        Ok(path)
    }
}
