/// Canonical name of the timestamp column after cleaning
pub const DATETIME_COLUMN: &str = "Datetime";

/// Registry column headers as published by GIOŚ
pub const REGISTRY_CURRENT_CODE: &str = "Kod stacji";
pub const REGISTRY_HISTORICAL_CODE: &str = "Stary Kod stacji";
pub const REGISTRY_CITY: &str = "Miejscowość";
pub const REGISTRY_REGION: &str = "Województwo";

/// Daily mean above this value counts as an exceedance day (µg/m³)
pub const EXCEEDANCE_THRESHOLD: f64 = 15.0;

/// Last year published in the short (pre-2016) sheet layout
pub const DEFAULT_SCHEMA_CUTOFF_YEAR: i32 = 2015;

/// Concentration sanity bounds (µg/m³)
pub const MIN_VALID_PM25: f64 = 0.0;
pub const MAX_PLAUSIBLE_PM25: f64 = 1000.0;

/// File names
pub const REGISTRY_FILE: &str = "Metadata.csv";
pub const RAW_FILE_TEMPLATE: &str = "raw{year}.csv";
pub const COMBINED_FILE: &str = "cleaned_and_combined.csv";
pub const COMBINED_PARQUET_FILE: &str = "cleaned_and_combined.parquet";
pub const MONTHLY_FILE: &str = "monthly_PM25.csv";
pub const CITY_MONTHLY_FILE: &str = "city_monthly_PM25.csv";
pub const EXCEEDANCE_FILE: &str = "exceedance_days.csv";
pub const REGIONAL_FILE: &str = "regional_exceedance.csv";
pub const TREND_FILE: &str = "trend.csv";
pub const HEATMAP_FILE: &str = "heatmap.csv";
pub const SUMMARY_FILE: &str = "summary.json";

/// Directory names
pub const DEFAULT_DATA_DIR: &str = "data/raw";
pub const DEFAULT_OUTPUT_DIR: &str = "data/processed";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
