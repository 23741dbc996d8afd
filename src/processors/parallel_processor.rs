use crate::error::{ProcessingError, Result};
use crate::models::{CombinedDataset, RawTable, StationRegistry, YearTable};
use crate::processors::{
    AlignmentStats, CityEnricher, CodeNormalizer, MissingnessSink, Reshaper, StationCodeMapping,
    TableCleaner, YearAligner, YearSummary,
};
use crate::readers::RawTableReader;
use crate::utils::constants::DEFAULT_SCHEMA_CUTOFF_YEAR;
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::info;

/// Where one year's raw sheet comes from
#[derive(Debug, Clone)]
pub enum YearSource {
    Table { year: i32, table: RawTable },
    File { year: i32, path: PathBuf },
}

impl YearSource {
    pub fn year(&self) -> i32 {
        match self {
            YearSource::Table { year, .. } | YearSource::File { year, .. } => *year,
        }
    }
}

/// Result of running every year through the pipeline and aligning them
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub dataset: CombinedDataset,
    pub alignment: AlignmentStats,
    pub years: Vec<YearSummary>,
}

/// Runs the per-year stages on a worker pool, then aligns the years
pub struct ParallelProcessor {
    max_workers: usize,
    cutoff_year: i32,
    reader: RawTableReader,
}

impl ParallelProcessor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            cutoff_year: DEFAULT_SCHEMA_CUTOFF_YEAR,
            reader: RawTableReader::new(),
        }
    }

    pub fn with_cutoff_year(mut self, cutoff_year: i32) -> Self {
        self.cutoff_year = cutoff_year;
        self
    }

    pub fn with_reader(mut self, reader: RawTableReader) -> Self {
        self.reader = reader;
        self
    }

    /// Clean → normalize codes → reshape → attach cities, for a single year
    pub fn process_year(
        &self,
        raw: &RawTable,
        year: i32,
        registry: &StationRegistry,
        mapping: &StationCodeMapping,
        sink: &dyn MissingnessSink,
    ) -> Result<YearTable> {
        let cleaned = TableCleaner::with_cutoff_year(self.cutoff_year).clean(raw, year, sink)?;
        let normalized = CodeNormalizer::new(mapping).normalize(cleaned)?;
        let long = Reshaper::new().to_long(&normalized)?;
        let enriched = CityEnricher::new(registry).enrich(long);

        let summary = YearSummary::from_table(&enriched);
        info!(
            "year {}: {} records, {} stations, {} cities",
            year, summary.records, summary.stations, summary.cities
        );

        Ok(enriched)
    }

    fn process_source(
        &self,
        source: &YearSource,
        registry: &StationRegistry,
        mapping: &StationCodeMapping,
        sink: &dyn MissingnessSink,
    ) -> Result<YearTable> {
        match source {
            YearSource::Table { year, table } => {
                self.process_year(table, *year, registry, mapping, sink)
            }
            YearSource::File { year, path } => {
                let table = self.reader.read(path)?;
                self.process_year(&table, *year, registry, mapping, sink)
            }
        }
    }

    /// Process every year in parallel; alignment starts only once all
    /// years have finished, and the first failing year aborts the run.
    pub fn process_all(
        &self,
        sources: &[YearSource],
        registry: &StationRegistry,
        sink: &dyn MissingnessSink,
        progress: Option<&ProgressReporter>,
    ) -> Result<PipelineOutput> {
        let mapping = StationCodeMapping::from_registry(registry);
        info!(
            "processing {} years with {} workers ({} historical codes)",
            sources.len(),
            self.max_workers,
            mapping.len()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let tables: Result<Vec<YearTable>> = pool.install(|| {
            sources
                .par_iter()
                .map(|source| {
                    let result = self.process_source(source, registry, &mapping, sink);

                    if let Some(p) = progress {
                        p.increment(1);
                    }

                    result
                })
                .collect()
        });
        let tables = tables?;

        if let Some(p) = progress {
            p.set_message("Aligning years...");
        }

        let mut years: Vec<YearSummary> = tables.iter().map(YearSummary::from_table).collect();
        years.sort_by_key(|summary| summary.year);

        let (dataset, alignment) = YearAligner::new().align(tables)?;

        Ok(PipelineOutput {
            dataset,
            alignment,
            years,
        })
    }
}

impl Default for ParallelProcessor {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
