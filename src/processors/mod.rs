pub mod aggregator;
pub mod city_enricher;
pub mod code_normalizer;
pub mod integrity_checker;
pub mod parallel_processor;
pub mod reshaper;
pub mod table_cleaner;
pub mod year_aligner;

pub use aggregator::Aggregator;
pub use city_enricher::CityEnricher;
pub use code_normalizer::{CodeNormalizer, StationCodeMapping};
pub use integrity_checker::{
    IntegrityChecker, IntegrityReport, ValueViolation, ViolationType, YearSummary,
};
pub use parallel_processor::{ParallelProcessor, PipelineOutput, YearSource};
pub use reshaper::Reshaper;
pub use table_cleaner::{
    ColumnMissingness, MissingnessReport, MissingnessSink, TableCleaner, TracingSink,
};
pub use year_aligner::{AlignmentStats, YearAligner};
